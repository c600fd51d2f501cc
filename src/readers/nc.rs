use std::path::{Path, PathBuf};

use super::{DataReader, IceChart, ReadError};

pub const LAT_VARIABLE: &str = "lat";
pub const LON_VARIABLE: &str = "lon";
pub const CONC_VARIABLE: &str = "ice_concentration";

pub struct NcReader {
    pub path: PathBuf,
}

impl NcReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

fn variable<'f>(file: &'f netcdf::File, name: &str) -> Result<netcdf::Variable<'f>, ReadError> {
    file.variable(name)
        .ok_or_else(|| ReadError::MissingVariable(name.to_string()))
}

// Axes are single precision in the Baltic charts but some mirrors store doubles
fn read_axis(var: &netcdf::Variable) -> Result<Vec<f32>, ReadError> {
    match var.get_values::<f32, _>(..) {
        Ok(values) => Ok(values),
        Err(_) => Ok(var
            .get_values::<f64, _>(..)?
            .into_iter()
            .map(|v| v as f32)
            .collect()),
    }
}

fn read_concentration(var: &netcdf::Variable) -> Result<Vec<i16>, ReadError> {
    match var.get_values::<i16, _>(..) {
        Ok(values) => Ok(values),
        Err(_) => Ok(var
            .get_values::<f32, _>(..)?
            .into_iter()
            .map(|v| v.round() as i16)
            .collect()),
    }
}

impl DataReader for NcReader {
    fn read_chart(&self) -> Result<IceChart, ReadError> {
        let file = netcdf::open(&self.path)?;

        let lat = read_axis(&variable(&file, LAT_VARIABLE)?)?;
        let lon = read_axis(&variable(&file, LON_VARIABLE)?)?;

        let conc_var = variable(&file, CONC_VARIABLE)?;
        let shape: Vec<usize> = conc_var.dimensions().iter().map(|d| d.len()).collect();

        // One time step on the lat/lon axes
        if shape != [1, lat.len(), lon.len()] {
            return Err(ReadError::Shape {
                name: CONC_VARIABLE.to_string(),
                shape,
            });
        }

        let conc = read_concentration(&conc_var)?;

        Ok(IceChart { lat, lon, conc })
    }
}
