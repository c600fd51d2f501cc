use tracing::info;

use super::{charts_in_range, load_chart};
use crate::cache::ensure_dir;
use crate::config::Config;
use crate::error::Result;
use crate::readers::{IceChart, IceChartStamp};
use crate::render::map::{concentration_image, overlay_lines};
use crate::render::{FontStrip, RenderError, save_png};
use image::RgbImage;

/// The annotated concentration map of one chart.
pub fn render_map(
    chart: &IceChart,
    stamp: &IceChartStamp,
    strip: &FontStrip,
) -> std::result::Result<RgbImage, RenderError> {
    let mut img = concentration_image(&chart.conc, chart.nlat(), chart.nlon());
    let lines = overlay_lines(stamp);
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    strip.overlay(&mut img, &lines)?;
    Ok(img)
}

pub fn run(config: &Config) -> Result<()> {
    let maps_dir = config.maps_dir();
    ensure_dir(&maps_dir)?;

    let strip = FontStrip::open(config.font_strip(), config.char_width())?;

    for (path, stamp) in charts_in_range(config) {
        let out = maps_dir.join(format!("{}.png", stamp.stem()));
        if out.exists() {
            continue;
        }

        info!("Making \"{}\" ...", out.display());
        let Some(chart) = load_chart(&path) else {
            continue;
        };
        if !chart.has_sea_ice() {
            info!(" > Skipping, no sea ice.");
            continue;
        }

        save_png(&render_map(&chart, &stamp, &strip)?, &out)?;
    }

    Ok(())
}
