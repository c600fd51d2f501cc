//! Checks that every chart shares one grid and one land/water mask, then caches the grid, the
//! pixel areas and the area/latitude polynomial.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{charts_in_range, load_chart};
use crate::cache::{ensure_dir, load_if_present, read_values_exact, write_values};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fit::{polyfit, write_coefficients};
use crate::geodesy::{AreaParams, pixel_areas};
use crate::readers::IceChart;
use crate::render::map::mask_image;
use crate::render::save_png;
use crate::utils::{all_close, print_area_statistics};

const RTOL: f64 = 1.0e-5;
const ATOL: f64 = 1.0e-8;

/// The shared grid, seeded from the caches and then from the first readable chart.
#[derive(Debug, Default)]
pub struct GridCheck {
    lat: Option<Vec<f32>>,
    lon: Option<Vec<f32>>,
    mask: Option<Vec<i16>>,
}

impl GridCheck {
    pub fn new(lat: Option<Vec<f32>>, lon: Option<Vec<f32>>, mask: Option<Vec<i16>>) -> Self {
        Self { lat, lon, mask }
    }

    pub fn lat(&self) -> Option<&[f32]> {
        self.lat.as_deref()
    }

    pub fn lon(&self) -> Option<&[f32]> {
        self.lon.as_deref()
    }

    pub fn mask(&self) -> Option<&[i16]> {
        self.mask.as_deref()
    }

    /// Adopts the axes of the first chart and compares later charts against them.
    /// Returns `true` when the axes were adopted.
    pub fn check_axes(&mut self, chart: &IceChart, path: &Path) -> Result<bool> {
        match (&self.lat, &self.lon) {
            (Some(lat), Some(lon)) => {
                if !all_close(&chart.lat, lat, RTOL, ATOL)
                    || !all_close(&chart.lon, lon, RTOL, ATOL)
                {
                    return Err(Error::Data(format!(
                        "the latitude/longitude axes of \"{}\" differ from the others",
                        path.display()
                    )));
                }
                Ok(false)
            }
            _ => {
                self.lat = Some(chart.lat.clone());
                self.lon = Some(chart.lon.clone());
                Ok(true)
            }
        }
    }

    /// Charts without sea ice show the bare land/water mask, which must never change.
    /// Returns `true` when the mask was adopted.
    pub fn check_mask(&mut self, chart: &IceChart, path: &Path) -> Result<bool> {
        if chart.has_sea_ice() {
            return Ok(false);
        }
        match &self.mask {
            Some(mask) if *mask != chart.conc => Err(Error::Data(format!(
                "the land/water mask of \"{}\" differs from the others",
                path.display()
            ))),
            Some(_) => Ok(false),
            None => {
                self.mask = Some(chart.conc.clone());
                Ok(true)
            }
        }
    }
}

struct Outputs {
    lat: PathBuf,
    lon: PathBuf,
    conc: PathBuf,
    conc_png: PathBuf,
    areas: PathBuf,
    coef: PathBuf,
}

impl Outputs {
    fn new(config: &Config) -> Self {
        Self {
            lat: config.output_path("lat.bin"),
            lon: config.output_path("lon.bin"),
            conc: config.output_path("conc.bin"),
            conc_png: config.output_path("conc.png"),
            areas: config.output_path("areas.bin"),
            coef: config.output_path("areaCoef.json"),
        }
    }
}

fn load_grid(outputs: &Outputs) -> Result<GridCheck> {
    let lat: Option<Vec<f32>> = load_if_present(&outputs.lat)?;
    let lon: Option<Vec<f32>> = load_if_present(&outputs.lon)?;

    let mask = match (&lat, &lon) {
        (Some(lat), Some(lon)) if outputs.conc.exists() => {
            info!("Loading \"{}\" ...", outputs.conc.display());
            Some(read_values_exact(&outputs.conc, lat.len() * lon.len())?)
        }
        _ => None,
    };

    Ok(GridCheck::new(lat, lon, mask))
}

fn write_if_absent<T: crate::cache::CacheValue>(path: &Path, values: &[T]) -> Result<()> {
    if !path.exists() {
        info!("Making \"{}\" ...", path.display());
        write_values(path, values)?;
    }
    Ok(())
}

/// Pixel-centre latitude of every cell of a `(lat.len() - 1, cols)` area grid.
pub fn centre_latitudes(lat: &[f32], cols: usize) -> Vec<f64> {
    lat.windows(2)
        .flat_map(|w| std::iter::repeat_n(0.5 * (w[0] as f64 + w[1] as f64), cols))
        .collect()
}

pub fn run(config: &Config, params: &AreaParams) -> Result<()> {
    ensure_dir(config.output_dir())?;
    let outputs = Outputs::new(config);
    let mut grid = load_grid(&outputs)?;

    for (path, _) in charts_in_range(config) {
        info!("Checking \"{}\" ...", path.display());
        let Some(chart) = load_chart(&path) else {
            continue;
        };
        debug!("{}", chart);

        if grid.check_axes(&chart, &path)? {
            write_if_absent(&outputs.lat, &chart.lat)?;
            write_if_absent(&outputs.lon, &chart.lon)?;
        }

        if grid.check_mask(&chart, &path)? {
            // Rejects unexpected values before anything is cached
            let mask = mask_image(&chart.conc, chart.nlat(), chart.nlon())?;
            write_if_absent(&outputs.conc, &chart.conc)?;
            if !outputs.conc_png.exists() {
                info!("Making \"{}\" ...", outputs.conc_png.display());
                save_png(&mask, &outputs.conc_png)?;
            }
        }
    }

    let (Some(lat), Some(lon)) = (grid.lat(), grid.lon()) else {
        return Err(Error::Data(format!(
            "no readable ice charts under \"{}\"",
            config.data_dir().display()
        )));
    };
    if grid.mask().is_none() {
        warn!("Every chart has sea ice; no land mask was cached");
    }
    let rows = lat.len().saturating_sub(1);
    let cols = lon.len().saturating_sub(1);

    let areas = if outputs.areas.exists() {
        info!("Loading \"{}\" ...", outputs.areas.display());
        read_values_exact(&outputs.areas, rows * cols)?
    } else {
        let areas = pixel_areas(lat, lon, params);
        info!("Making \"{}\" ...", outputs.areas.display());
        write_values(&outputs.areas, &areas)?;
        areas
    };

    print_area_statistics(&areas);

    let x = centre_latitudes(lat, cols);
    let y: Vec<f64> = areas.iter().map(|&a| a as f64).collect();
    let coef = polyfit(&x, &y, 2)?;

    info!("Making \"{}\" ...", outputs.coef.display());
    write_coefficients(&outputs.coef, &coef)?;

    Ok(())
}
