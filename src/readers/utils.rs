use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const PREFIX: &str = "ice_conc_baltic_";
const SUFFIX: &str = ".nc";

/// Timestamp embedded in an ice chart file name (`ice_conc_baltic_YYYYMMDDHHMM.nc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IceChartStamp(NaiveDateTime);

impl IceChartStamp {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let digits = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
        if digits.len() != 12 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M")
            .ok()
            .map(IceChartStamp)
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// File stem shared by every artefact made from this chart.
    pub fn stem(&self) -> String {
        self.0.format("%Y-%m-%d_%H-%M").to_string()
    }

    /// Text drawn on the maps.
    pub fn label(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Every ice chart below `data_dir`, sorted by path.
pub fn find_ice_charts(data_dir: &Path) -> Vec<PathBuf> {
    if !data_dir.exists() {
        return Vec::new();
    }

    let mut charts: Vec<PathBuf> = WalkDir::new(data_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| IceChartStamp::from_path(entry.path()).is_some())
        .map(|entry| entry.into_path())
        .collect();

    charts.sort();
    charts
}
