//! Least-squares fits and the `areaCoef.json` coefficient files.

use nalgebra as na;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use thiserror::Error;

use crate::format::sci;

#[derive(Debug, Error)]
pub enum FitError {
    #[error("polynomial fit failed: {0}")]
    PolyFit(String),
    #[error("need at least {needed} points, got {got}")]
    TooFewPoints { needed: usize, got: usize },
    #[error("x and y lengths differ ({x} vs {y})")]
    LengthMismatch { x: usize, y: usize },
    #[error("expected {expected} coefficients, got {got}")]
    Coefficients { expected: usize, got: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Least-squares polynomial fit, coefficients in ascending powers of `x`.
///
/// `x` is mapped onto [-1, 1] before solving and the coefficients are converted back, which keeps
/// the design matrix well conditioned for large offsets such as latitudes.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    let number_of_columns = degree + 1;
    if x.len() < number_of_columns {
        return Err(FitError::TooFewPoints {
            needed: number_of_columns,
            got: x.len(),
        });
    }

    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let offset = 0.5 * (lo + hi);
    let half_width = if hi > lo { 0.5 * (hi - lo) } else { 1.0 };

    let mut a = na::DMatrix::<f64>::zeros(x.len(), number_of_columns);
    for (row, &xi) in x.iter().enumerate() {
        let s = (xi - offset) / half_width;
        // First column is always 1
        a[(row, 0)] = 1.0;
        for col in 1..number_of_columns {
            a[(row, col)] = a[(row, col - 1)] * s;
        }
    }

    let b = na::DVector::from_column_slice(y);
    let decomp = na::SVD::new(a, true, true);
    let scaled: Vec<f64> = decomp
        .solve(&b, 1.0e-18)
        .map_err(|e| FitError::PolyFit(e.to_string()))?
        .iter()
        .copied()
        .collect();

    // Expand sum_k a_k ((x - offset) / half_width)^k into powers of x
    let mut coef = vec![0.0; number_of_columns];
    for (k, &ak) in scaled.iter().enumerate() {
        let scale = ak / half_width.powi(k as i32);
        for (j, c) in coef.iter_mut().enumerate().take(k + 1) {
            *c += scale * binomial(k, j) * (-offset).powi((k - j) as i32);
        }
    }

    Ok(coef)
}

/// Ordinary least-squares straight line, returning `(slope, intercept)`.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<(f64, f64), FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(FitError::TooFewPoints {
            needed: 2,
            got: x.len(),
        });
    }

    let n = x.len() as f64;
    let xbar = x.iter().sum::<f64>() / n;
    let ybar = y.iter().sum::<f64>() / n;

    let (top, bot) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(top, bot), (&xi, &yi)| {
            (top + (xi - xbar) * yi, bot + (xi - xbar).powi(2))
        });

    if bot == 0.0 {
        return Err(FitError::PolyFit("all x values are equal".to_string()));
    }

    let m = top / bot;
    Ok((m, ybar - m * xbar))
}

pub fn evaluate(coef: &[f64], x: f64) -> f64 {
    coef.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Writes coefficients as a JSON array, one `%.15e` value per line.
pub fn write_coefficients(path: &Path, coef: &[f64]) -> Result<(), FitError> {
    let body = coef
        .iter()
        .map(|&c| format!("    {}", sci(c, 15)))
        .collect::<Vec<_>>()
        .join(",\n");

    let mut file = File::create(path)?;
    write!(file, "[\n{}\n]", body)?;
    Ok(())
}

pub fn read_coefficients(path: &Path, expected: usize) -> Result<Vec<f64>, FitError> {
    let reader = BufReader::new(File::open(path)?);
    let coef: Vec<f64> = serde_json::from_reader(reader)?;
    if coef.len() != expected {
        return Err(FitError::Coefficients {
            expected,
            got: coef.len(),
        });
    }
    Ok(coef)
}

/// Area of one pixel per latitude row from the `area(lat)` polynomial [km²].
pub fn lat_to_area(coef: &[f64], lat: &[f32]) -> Vec<f64> {
    lat.iter().map(|&l| evaluate(coef, l as f64)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_polyfit_recovers_quadratic() {
        let x: Vec<f64> = (0..50).map(|i| 53.0 + 0.25 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 3.0 - 0.02 * v - 0.0002 * v * v).collect();

        let coef = polyfit(&x, &y, 2).unwrap();

        assert!((coef[0] - 3.0).abs() < 1.0e-8);
        assert!((coef[1] + 0.02).abs() < 1.0e-9);
        assert!((coef[2] + 0.0002).abs() < 1.0e-11);
    }

    #[test]
    fn test_polyfit_needs_enough_points() {
        assert!(matches!(
            polyfit(&[1.0, 2.0], &[1.0, 2.0], 2),
            Err(FitError::TooFewPoints { needed: 3, got: 2 })
        ));
        assert!(matches!(
            polyfit(&[1.0, 2.0, 3.0], &[1.0, 2.0], 2),
            Err(FitError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_linear_fit() {
        let x = [2018.0, 2019.0, 2020.0, 2021.0];
        let y = [10.0, 8.0, 6.0, 4.0];

        let (m, c) = linear_fit(&x, &y).unwrap();

        assert!((m + 2.0).abs() < 1.0e-9);
        assert!((m * 2020.0 + c - 6.0).abs() < 1.0e-6);
        assert!(linear_fit(&[1.0, 1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_evaluate() {
        assert_eq!(evaluate(&[1.0, 2.0, 3.0], 2.0), 17.0);
        assert_eq!(evaluate(&[], 2.0), 0.0);
    }

    #[test]
    fn test_coefficient_file_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("areaCoef.json");

        write_coefficients(&path, &[1.5, -0.025, 1.0e-4]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            concat!(
                "[\n    1.500000000000000e+00,\n    -2.500000000000000e-02,\n",
                "    1.000000000000000e-04\n]"
            )
        );

        let coef = read_coefficients(&path, 3).unwrap();
        assert_eq!(coef, vec![1.5, -0.025, 1.0e-4]);
        assert!(read_coefficients(&path, 2).is_err());
    }
}
