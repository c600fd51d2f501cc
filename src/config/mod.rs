use chrono::{Duration, Local, NaiveDate};

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub mod error;
pub use error::ConfigError;

pub const DEFAULT_DATA_DIR: &str =
    "Copernicus/SEAICE_BAL_SEAICE_L4_NRT_OBSERVATIONS_011_004/FMI-BAL-SEAICE_CONC-L4-NRT-OBS";
pub const DEFAULT_OUTPUT_DIR: &str = "studyBalticConcentration";
pub const DEFAULT_FONT_STRIP: &str = "makeAlphabet.png";
pub const DEFAULT_CHAR_WIDTH: u32 = 12;

/// First day covered by the Baltic ice charts.
pub fn dataset_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone)]
pub struct Config {
    data_dir: PathBuf,
    output_dir: PathBuf,
    start_date: NaiveDate,
    end_date: NaiveDate,
    font_strip: PathBuf,
    char_width: u32,
}

// Deserializes a Config, filling in defaults for anything missing and ensuring the dates are
// valid and in order.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            data_dir: Option<PathBuf>,
            output_dir: Option<PathBuf>,
            start_date: Option<String>,
            end_date: Option<String>,
            font_strip: Option<PathBuf>,
            char_width: Option<u32>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        let start_date = match helper.start_date {
            Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|e| D::Error::custom(ConfigError::from(e)))?,
            None => dataset_start(),
        };

        let end_date = match helper.end_date {
            Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|e| D::Error::custom(ConfigError::from(e)))?,
            None => Local::now().date_naive(),
        };

        if start_date > end_date {
            return Err(D::Error::custom(ConfigError::DateOrder));
        }

        let char_width = helper.char_width.unwrap_or(DEFAULT_CHAR_WIDTH);
        if char_width == 0 {
            return Err(D::Error::custom(ConfigError::CharWidth));
        }

        Ok(Config {
            data_dir: helper
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            output_dir: helper
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            start_date,
            end_date,
            font_strip: helper
                .font_strip
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_STRIP)),
            char_width,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(dataset_start(), Local::now().date_naive())
    }
}

impl Config {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            start_date,
            end_date,
            font_strip: PathBuf::from(DEFAULT_FONT_STRIP),
            char_width: DEFAULT_CHAR_WIDTH,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_font_strip(mut self, font_strip: PathBuf) -> Self {
        self.font_strip = font_strip;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn font_strip(&self) -> &Path {
        &self.font_strip
    }

    pub fn char_width(&self) -> u32 {
        self.char_width
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Path of a file directly under the output directory.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.output_dir.join("maps")
    }

    pub fn histograms_dir(&self) -> PathBuf {
        self.output_dir.join("histograms")
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.output_dir.join("plots")
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }
}

impl Iterator for Config {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start_date <= self.end_date {
            let current_date = self.start_date;
            self.start_date = current_date.checked_add_signed(Duration::days(1))?;
            Some(current_date)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        let mut file = File::create(&file_path).unwrap();

        let config_data = r#"
    {
        "data_dir": "/data/baltic",
        "output_dir": "out",
        "start_date": "2023-01-01",
        "end_date": "2023-01-10",
        "char_width": 11
    }
    "#;

        file.write_all(config_data.as_bytes()).unwrap();

        let config = Config::from_file(file_path).unwrap();

        assert_eq!(config.data_dir(), Path::new("/data/baltic"));
        assert_eq!(config.histograms_dir(), PathBuf::from("out/histograms"));
        assert_eq!(config.char_width(), 11);
        assert_eq!(config.font_strip(), Path::new(DEFAULT_FONT_STRIP));

        assert_eq!(
            config.start_date,
            NaiveDate::from_ymd_opt(2023, 1, 1).expect("Invalid date")
        );

        assert_eq!(
            config.end_date,
            NaiveDate::from_ymd_opt(2023, 1, 10).expect("Invalid date")
        );
    }

    #[test]
    fn test_defaults_when_fields_are_missing() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.start_date(), dataset_start());
        assert_eq!(config.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
        assert_eq!(config.char_width(), DEFAULT_CHAR_WIDTH);
    }

    #[test]
    fn test_dates_out_of_order() {
        let result: Result<Config, _> =
            serde_json::from_str(r#"{"start_date": "2023-02-01", "end_date": "2023-01-01"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_zero_char_width() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"char_width": 0}"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_iterator() {
        let config = Config::new(
            NaiveDate::from_ymd_opt(2023, 12, 30).expect("Invalid date"),
            NaiveDate::from_ymd_opt(2024, 1, 1).expect("Invalid date"),
        );

        let dates: Vec<NaiveDate> = config.collect();

        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2023, 12, 30).expect("Invalid date"),
                NaiveDate::from_ymd_opt(2023, 12, 31).expect("Invalid date"),
                NaiveDate::from_ymd_opt(2024, 1, 1).expect("Invalid date"),
            ]
        );
    }
}
