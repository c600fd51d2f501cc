use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

use super::sorted_glob;
use crate::cache::ensure_dir;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::histogram::latest_for_date;
use crate::render::frame::compose;
use crate::render::{open_rgb, save_png};

fn make_frame(config: &Config, plot_path: &Path, date: NaiveDate, out: &Path) -> Result<()> {
    let Some(map_path) = latest_for_date(&config.maps_dir(), date, "png")? else {
        warn!(" > Skipping, no map.");
        return Ok(());
    };

    let frame = compose(&open_rgb(&map_path)?, &open_rgb(plot_path)?);
    save_png(&frame, out)?;
    Ok(())
}

pub fn run(config: &Config) -> Result<()> {
    let frames_dir = config.frames_dir();
    ensure_dir(&frames_dir)?;

    for plot_path in sorted_glob(&config.plots_dir().join("????-??-??.png"))? {
        let Some(stem) = plot_path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let out = frames_dir.join(format!("{stem}.png"));
        if out.exists() {
            continue;
        }

        info!("Making \"{}\" ...", out.display());
        let date = NaiveDate::parse_from_str(stem, "%Y-%m-%d")
            .map_err(|e| Error::Data(format!("\"{}\": {}", plot_path.display(), e)))?;
        make_frame(config, &plot_path, date, &out)?;
    }

    Ok(())
}
