use crate::config::Config;
use chrono::{Datelike, NaiveDate};

/// Day on and after which a date counts toward the following winter.
const SOLSTICE: (u32, u32) = (6, 21);

pub struct DateGenerator {
    config: Config,
}

impl DateGenerator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn generate_date_series(&self) -> Vec<NaiveDate> {
        let config_iter = self.config.clone();

        config_iter.collect()
    }
}

/// The winter a date belongs to, keyed by the year in which that winter ends.
pub fn winter_of(date: NaiveDate) -> i32 {
    if (date.month(), date.day()) < SOLSTICE {
        date.year()
    } else {
        date.year() + 1
    }
}

/// Whole days between `start` and `date`.
pub fn day_index(start: NaiveDate, date: NaiveDate) -> i32 {
    (date - start).num_days() as i32
}
