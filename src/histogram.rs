//! Sea-ice area per concentration bucket.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::sci;

/// Buckets 0..=100 %.
pub const BUCKETS: usize = 101;

pub const HEADER: [&str; 2] = ["sea ice concentration [%]", "area [km²]"];

#[derive(Debug, Error)]
pub enum HistogramError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("concentration {0} is outside 0..=100")]
    Bucket(i64),
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    areas: [f64; BUCKETS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            areas: [0.0; BUCKETS],
        }
    }
}

impl Histogram {
    /// Totals the area of each concentration over a `(nlat, nlon)` grid, where every cell of row
    /// `i` has the area `lat_to_area[i]`. Land and out-of-scope sentinels are ignored.
    pub fn from_chart(conc: &[i16], nlon: usize, lat_to_area: &[f64]) -> Self {
        let mut histogram = Histogram::default();
        if nlon == 0 {
            return histogram;
        }

        for (row, &cell_area) in conc.chunks_exact(nlon).zip(lat_to_area) {
            for &c in row {
                if (0..BUCKETS as i16).contains(&c) {
                    histogram.areas[c as usize] += cell_area;
                }
            }
        }
        histogram
    }

    #[cfg(test)]
    pub fn from_areas(areas: [f64; BUCKETS]) -> Self {
        Self { areas }
    }

    pub fn areas(&self) -> &[f64; BUCKETS] {
        &self.areas
    }

    /// Area covered by any sea ice [km²].
    pub fn total_ice_area(&self) -> f64 {
        self.areas[1..].iter().sum()
    }

    /// Area as if all sea ice were at 100 % concentration [km²].
    pub fn equivalent_area(&self) -> f64 {
        0.01 * self.areas[1..]
            .iter()
            .enumerate()
            .map(|(i, &a)| (i + 1) as f64 * a)
            .sum::<f64>()
    }

    /// Largest area of any single non-zero concentration [km²].
    pub fn max_ice_bucket(&self) -> f64 {
        self.areas[1..].iter().copied().fold(0.0, f64::max)
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), HistogramError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(HEADER)?;
        for (conc, &area) in self.areas.iter().enumerate() {
            writer.write_record([conc.to_string(), sci(area, 15)])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self, HistogramError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut histogram = Histogram::default();

        for record in reader.deserialize::<(i64, f64)>() {
            let (conc, area) = record?;
            if !(0..BUCKETS as i64).contains(&conc) {
                return Err(HistogramError::Bucket(conc));
            }
            histogram.areas[conc as usize] = area;
        }
        Ok(histogram)
    }
}

/// All histograms under `dir` in chronological order.
pub fn list_histograms(dir: &Path) -> Result<Vec<PathBuf>, HistogramError> {
    let pattern = dir.join("????-??-??_??-??.csv");
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|p| p.ok())
        .collect();
    paths.sort();
    Ok(paths)
}

/// The most up-to-date artefact of a day, e.g. `dir/2021-02-15_??-??.<ext>`.
pub fn latest_for_date(
    dir: &Path,
    date: NaiveDate,
    ext: &str,
) -> Result<Option<PathBuf>, HistogramError> {
    let pattern = dir.join(format!("{}_??-??.{}", date.format("%Y-%m-%d"), ext));
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|p| p.ok())
        .collect();
    paths.sort();
    Ok(paths.pop())
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Highest single non-zero occurrence [km²].
    pub max_bucket: f64,
    /// Highest 100%-concentration equivalent area [km²].
    pub max_equivalent: f64,
}

pub fn summarise(paths: &[PathBuf]) -> Result<Summary, HistogramError> {
    let mut summary = Summary::default();
    for path in paths {
        let histogram = Histogram::read_csv(path)?;
        summary.max_bucket = summary.max_bucket.max(histogram.max_ice_bucket());
        summary.max_equivalent = summary.max_equivalent.max(histogram.equivalent_area());
    }
    Ok(summary)
}
