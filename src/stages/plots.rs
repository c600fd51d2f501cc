use std::path::PathBuf;
use tracing::info;

use crate::cache::ensure_dir;
use crate::config::Config;
use crate::error::Result;
use crate::histogram::{Histogram, latest_for_date};
use crate::render::plots::date_plot;
use crate::trends::{TrendRow, TrendSeries};

/// Latest histogram of the day, provided there is also a map for it.
fn inputs_for(config: &Config, row: &TrendRow) -> Result<Option<PathBuf>> {
    let histogram = latest_for_date(&config.histograms_dir(), row.date, "csv")?;
    let map = latest_for_date(&config.maps_dir(), row.date, "png")?;
    Ok(histogram.filter(|_| map.is_some()))
}

pub fn run(config: &Config) -> Result<()> {
    let plots_dir = config.plots_dir();
    ensure_dir(&plots_dir)?;

    let series = TrendSeries::read_csv(&config.output_path("trends.csv"))?;

    for row in series.rows() {
        let out = plots_dir.join(format!("{}.png", row.date.format("%Y-%m-%d")));
        if out.exists() {
            continue;
        }

        info!("Making \"{}\" ...", out.display());
        let Some(histogram_path) = inputs_for(config, row)? else {
            info!(" > Skipping, no histogram/map.");
            continue;
        };

        let histogram = Histogram::read_csv(&histogram_path)?;
        date_plot(&out, &series, row.date, &histogram)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::BUCKETS;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_inputs_need_both_histogram_and_map() {
        let dir = tempdir().unwrap();
        let config = Config::default().with_output_dir(dir.path().to_path_buf());
        ensure_dir(&config.histograms_dir()).unwrap();
        ensure_dir(&config.maps_dir()).unwrap();

        let row = TrendRow {
            date: NaiveDate::from_ymd_opt(2021, 2, 15).unwrap(),
            total: 0.0,
            equivalent: 0.0,
            observed: true,
        };

        Histogram::from_areas([0.0; BUCKETS])
            .write_csv(&config.histograms_dir().join("2021-02-15_14-00.csv"))
            .unwrap();
        assert!(inputs_for(&config, &row).unwrap().is_none());

        fs::write(config.maps_dir().join("2021-02-15_02-00.png"), b"").unwrap();
        let path = inputs_for(&config, &row).unwrap().unwrap();
        assert!(path.ends_with("2021-02-15_14-00.csv"));
    }
}
