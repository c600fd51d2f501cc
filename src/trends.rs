//! Daily sea-ice area series and winter totals.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::date_gen::winter_of;
use crate::format::sci;
use crate::histogram::{Histogram, HistogramError, latest_for_date};

pub const HEADER: [&str; 3] = [
    "date",
    "total sea ice area [km²]",
    "100%-concentration equivalent sea ice area [km²]",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendRow {
    pub date: NaiveDate,
    /// Area covered by any sea ice [km²].
    pub total: f64,
    /// 100%-concentration equivalent area [km²].
    pub equivalent: f64,
    /// Whether a histogram existed for the day.
    pub observed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendSeries {
    rows: Vec<TrendRow>,
}

impl From<Vec<TrendRow>> for TrendSeries {
    fn from(rows: Vec<TrendRow>) -> Self {
        Self { rows }
    }
}

impl TrendSeries {
    /// One row per date, from the most up-to-date histogram of each day.
    pub fn build<I>(dates: I, histogram_dir: &Path) -> Result<Self, HistogramError>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut rows = Vec::new();
        for date in dates {
            let row = match latest_for_date(histogram_dir, date, "csv")? {
                Some(path) => {
                    debug!("Using \"{}\" for {}", path.display(), date);
                    let histogram = Histogram::read_csv(&path)?;
                    TrendRow {
                        date,
                        total: histogram.total_ice_area(),
                        equivalent: histogram.equivalent_area(),
                        observed: true,
                    }
                }
                None => TrendRow {
                    date,
                    total: 0.0,
                    equivalent: 0.0,
                    observed: false,
                },
            };
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[TrendRow] {
        &self.rows
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// Sum of the equivalent area per winter [km².day]. Every winter touched by the series gets
    /// an entry, even if it has no observations.
    pub fn winter_totals(&self) -> BTreeMap<i32, f64> {
        let mut totals = BTreeMap::new();
        for row in &self.rows {
            *totals.entry(winter_of(row.date)).or_insert(0.0) += row.equivalent;
        }
        totals
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), HistogramError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(HEADER)?;
        for row in &self.rows {
            let date = row.date.format("%Y-%m-%d").to_string();
            if row.observed {
                writer.write_record([date, sci(row.total, 15), sci(row.equivalent, 15)])?;
            } else {
                writer.write_record([date, "0".to_string(), sci(0.0, 6)])?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self, HistogramError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();

        for record in reader.deserialize::<(NaiveDate, f64, f64)>() {
            let (date, total, equivalent) = record?;
            rows.push(TrendRow {
                date,
                total,
                equivalent,
                observed: total > 0.0 || equivalent > 0.0,
            });
        }
        Ok(Self { rows })
    }
}
