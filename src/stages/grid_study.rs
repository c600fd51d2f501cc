//! How big is the data? A study of the grid spacing of one chart and of the pixel areas it
//! implies at different subdivision levels.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::sorted_glob;
use crate::cache::{ensure_dir, read_values_exact, write_values};
use crate::config::Config;
use crate::error::Result;
use crate::fit::{polyfit, write_coefficients};
use crate::format::sci;
use crate::geodesy::{AreaParams, pixel_areas};
use crate::readers::create_reader;
use crate::render::map::area_image;
use crate::render::plots::{AreaFit, SpacingPanel, area_fit_plot, spacing_plot};
use crate::render::save_png;
use crate::utils::{axis_steps, print_area_statistics};

pub const STEM: &str = "how-big-is-the-data";

/// Stated latitude spacing [°].
pub const NOMINAL_LAT: f64 = 0.009;
/// Stated longitude spacing [°].
pub const NOMINAL_LON: f64 = 0.018;
/// Width of a spacing histogram bin [°].
pub const BIN_WIDTH: f64 = 1.0e-6;
const HALF_BINS: usize = 15;

/// Lower and upper bounds of the area colour scale [km²].
const AREA_SCALE: (f64, f64) = (0.8, 1.2);

/// Counts of grid steps in 31 bins centred on the nominal spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingHistogram {
    pub centres: Vec<f64>,
    pub counts: Vec<u32>,
}

impl SpacingHistogram {
    pub fn new(steps: &[f64], nominal: f64) -> Self {
        let centres: Vec<f64> = (0..=2 * HALF_BINS)
            .map(|i| nominal + (i as f64 - HALF_BINS as f64) * BIN_WIDTH)
            .collect();
        let mut counts = vec![0; centres.len()];

        for &step in steps {
            let key = ((step - centres[0]) / BIN_WIDTH).floor();
            if key >= 0.0 && (key as usize) < counts.len() {
                counts[key as usize] += 1;
            } else {
                debug!("Step {:.9} ° is outside the histogram", step);
            }
        }

        Self { centres, counts }
    }
}

/// Difference of each step from the nominal spacing [%].
pub fn percent_differences(steps: &[f64], nominal: f64) -> Vec<f64> {
    steps.iter().map(|&s| 100.0 * (s / nominal - 1.0)).collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn level_path(dir: &Path, level: u32, ext: &str) -> PathBuf {
    dir.join(format!("{STEM}_areas_level={level}.{ext}"))
}

/// Cached area grids, ordered by level.
pub fn cached_levels(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let pattern = dir.join(format!("{STEM}_areas_level=*.bin"));
    let mut levels: Vec<(u32, PathBuf)> = sorted_glob(&pattern)?
        .into_iter()
        .filter_map(|path| {
            let level = path
                .file_stem()?
                .to_str()?
                .rsplit_once('=')?
                .1
                .parse()
                .ok()?;
            Some((level, path))
        })
        .collect();
    levels.sort();
    Ok(levels)
}

/// Row index of every cell of a `(rows, cols)` grid.
fn row_indices(rows: usize, cols: usize) -> Vec<f64> {
    (0..rows)
        .flat_map(|r| std::iter::repeat_n(r as f64, cols))
        .collect()
}

pub fn run(config: &Config, file: &Path, params: &AreaParams) -> Result<()> {
    let dir = config.output_dir();
    ensure_dir(dir)?;

    let chart = create_reader(file)?.read_chart()?;
    let (lat, lon) = (&chart.lat, &chart.lon);

    println!(
        "The axes are the same length as the data, so the longitude/latitude values are \
         either:"
    );
    println!(" * the pixel centres, in which case the pixel extents are unknown; or");
    println!(
        " * the upper-left corners, in which case the last row and column have unknown \
         extents."
    );
    if let (Some(first), Some(last)) = (lat.first(), lat.last()) {
        println!("The latitude values extend from {:.6} ° to {:.6} °.", first, last);
    }
    if let (Some(first), Some(last)) = (lon.first(), lon.last()) {
        println!("The longitude values extend from {:.6} ° to {:.6} °.", first, last);
    }

    let lat_steps = axis_steps(lat);
    let lon_steps = axis_steps(lon);
    let lat_percent = percent_differences(&lat_steps, NOMINAL_LAT);
    let lon_percent = percent_differences(&lon_steps, NOMINAL_LON);

    let (lo, hi) = min_max(&lat_steps);
    println!("The latitude heights vary from {:.6} ° to {:.6} °.", lo, hi);
    let (lo, hi) = min_max(&lon_steps);
    println!("The longitude widths vary from {:.6} ° to {:.6} °.", lo, hi);
    let (lo, hi) = min_max(&lat_percent);
    println!("The latitude percentage differences vary from {:+.4} % to {:+.4} %.", lo, hi);
    let (lo, hi) = min_max(&lon_percent);
    println!("The longitude percentage differences vary from {:+.4} % to {:+.4} %.", lo, hi);

    let rows = lat.len().saturating_sub(1);
    let cols = lon.len().saturating_sub(1);

    let bin_path = level_path(dir, params.level, "bin");
    let areas = if bin_path.exists() {
        info!("Loading \"{}\" ...", bin_path.display());
        read_values_exact(&bin_path, rows * cols)?
    } else {
        let areas = pixel_areas(lat, lon, params);
        info!("Making \"{}\" ...", bin_path.display());
        write_values(&bin_path, &areas)?;
        areas
    };
    print_area_statistics(&areas);

    let png_path = level_path(dir, params.level, "png");
    if !png_path.exists() {
        info!("Making \"{}\" ...", png_path.display());
        save_png(
            &area_image(&areas, rows, cols, AREA_SCALE.0, AREA_SCALE.1),
            &png_path,
        )?;
    }

    // Compare every level computed so far
    let x = row_indices(rows, cols);
    let mut grids = Vec::new();
    for (level, path) in cached_levels(dir)? {
        let areas: Vec<f32> = read_values_exact(&path, rows * cols)?;
        let y: Vec<f64> = areas.iter().map(|&a| a as f64).collect();
        let coef = polyfit(&x, &y, 2)?;
        write_coefficients(&level_path(dir, level, "json"), &coef)?;

        let label = format!("level={level}");
        println!(
            "  {} : {} + {} x + {} x²",
            label,
            sci(coef[0], 3),
            sci(coef[1], 3),
            sci(coef[2], 3)
        );
        grids.push((label, areas, coef));
    }

    let fits: Vec<AreaFit<'_>> = grids
        .iter()
        .map(|(label, areas, coef)| AreaFit {
            label: label.clone(),
            areas,
            coef,
        })
        .collect();
    let areas_plot = dir.join(format!("{STEM}_areas.png"));
    info!("Making \"{}\" ...", areas_plot.display());
    area_fit_plot(&areas_plot, &fits, rows, cols)?;

    let lat_histogram = SpacingHistogram::new(&lat_steps, NOMINAL_LAT);
    let lon_histogram = SpacingHistogram::new(&lon_steps, NOMINAL_LON);
    let points_plot = dir.join(format!("{STEM}_points.png"));
    info!("Making \"{}\" ...", points_plot.display());
    spacing_plot(
        &points_plot,
        &SpacingPanel {
            axis: "Latitude",
            extent: "Height",
            percent: &lat_percent,
            centres: &lat_histogram.centres,
            counts: &lat_histogram.counts,
            bin_width: BIN_WIDTH,
            nominal: NOMINAL_LAT,
        },
        &SpacingPanel {
            axis: "Longitude",
            extent: "Width",
            percent: &lon_percent,
            centres: &lon_histogram.centres,
            counts: &lon_histogram.counts,
            bin_width: BIN_WIDTH,
            nominal: NOMINAL_LON,
        },
    )?;

    Ok(())
}
