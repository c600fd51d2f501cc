use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Concentration value for land cells.
pub const LAND: i16 = -99;
/// Concentration value for water outside the charted area.
pub const OUT_OF_SCOPE: i16 = -59;
/// Concentration value for open water.
pub const WATER: i16 = 0;

pub trait DataReader {
    fn read_chart(&self) -> Result<IceChart, ReadError>;
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),
    #[error("missing variable: {0}")]
    MissingVariable(String),
    #[error("unexpected shape for {name}: {shape:?}")]
    Shape { name: String, shape: Vec<usize> },
    #[error("unknown file type: {0}")]
    UnknownFileType(PathBuf),
}

/// The first time step of an ice chart on its latitude/longitude axes.
#[derive(Debug, Clone, PartialEq)]
pub struct IceChart {
    pub lat: Vec<f32>,
    pub lon: Vec<f32>,
    /// Row-major `(lat, lon)` concentrations in percent.
    pub conc: Vec<i16>,
}

impl IceChart {
    pub fn nlat(&self) -> usize {
        self.lat.len()
    }

    pub fn nlon(&self) -> usize {
        self.lon.len()
    }

    pub fn max_conc(&self) -> i16 {
        self.conc.iter().copied().max().unwrap_or(i16::MIN)
    }

    pub fn has_sea_ice(&self) -> bool {
        self.max_conc() > 0
    }
}

impl fmt::Display for IceChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ice_cells = self.conc.iter().filter(|&&c| c > 0).count();

        write!(
            f,
            "Latitudes: {}\nLongitudes: {}\nCells: {}\nIce cells: {}\nMax concentration: {}",
            self.nlat(),
            self.nlon(),
            self.conc.len(),
            ice_cells,
            self.max_conc(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> IceChart {
        IceChart {
            lat: vec![60.0, 60.009],
            lon: vec![20.0, 20.018, 20.036],
            conc: vec![LAND, WATER, 40, OUT_OF_SCOPE, 100, 0],
        }
    }

    #[test]
    fn test_display() {
        let text = chart().to_string();

        assert!(text.contains("Latitudes: 2"));
        assert!(text.contains("Ice cells: 2"));
        assert!(text.contains("Max concentration: 100"));
    }

    #[test]
    fn test_sea_ice_presence() {
        let mut chart = chart();
        assert!(chart.has_sea_ice());
        assert_eq!(chart.max_conc(), 100);

        chart.conc = vec![LAND, WATER, WATER, OUT_OF_SCOPE, WATER, WATER];
        assert!(!chart.has_sea_ice());
    }
}
