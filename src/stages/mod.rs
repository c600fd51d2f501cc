//! One entry point per subcommand. Every stage skips outputs that already exist.

pub mod alphabet;
pub mod animate;
pub mod check_data;
pub mod frames;
pub mod grid_study;
pub mod histograms;
pub mod maps;
pub mod plots;

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::readers::{IceChart, IceChartStamp, create_reader, find_ice_charts};

/// Reads a chart, logging and skipping files that cannot be read.
pub(crate) fn load_chart(path: &Path) -> Option<IceChart> {
    match create_reader(path).and_then(|reader| reader.read_chart()) {
        Ok(chart) => Some(chart),
        Err(e) => {
            warn!(" > Skipping, error loading NetCDF: {}", e);
            None
        }
    }
}

/// Ice charts whose timestamp falls within the configured dates, sorted by path.
pub(crate) fn charts_in_range(config: &Config) -> Vec<(PathBuf, IceChartStamp)> {
    find_ice_charts(config.data_dir())
        .into_iter()
        .filter_map(|path| {
            let stamp = IceChartStamp::from_path(&path)?;
            let date = stamp.date();
            (config.start_date() <= date && date <= config.end_date()).then_some((path, stamp))
        })
        .collect()
}

pub(crate) fn sorted_glob(pattern: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|p| p.ok())
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_charts_in_range() {
        let dir = tempdir().unwrap();
        for name in [
            "ice_conc_baltic_202012311200.nc",
            "ice_conc_baltic_202101011200.nc",
            "ice_conc_baltic_202101021200.nc",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let config = Config::new(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        )
        .with_data_dir(dir.path().to_path_buf());

        let charts = charts_in_range(&config);

        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].1.stem(), "2021-01-01_12-00");
    }

    #[test]
    fn test_unreadable_chart_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ice_conc_baltic_202101011200.nc");
        fs::write(&path, b"not a netcdf file").unwrap();

        assert!(load_chart(&path).is_none());
    }

    #[test]
    fn test_sorted_glob() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("2021-01-02.png"), b"").unwrap();
        fs::write(dir.path().join("2021-01-01.png"), b"").unwrap();
        fs::write(dir.path().join("notes.png"), b"").unwrap();

        let paths = sorted_glob(&dir.path().join("????-??-??.png")).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("2021-01-01.png"));
    }
}
