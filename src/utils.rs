/// Minimum, maximum and mean of the finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

pub fn grid_statistics(values: &[f32]) -> Option<GridStatistics> {
    let valid_values: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| v as f64)
        .collect();

    if valid_values.is_empty() {
        return None;
    }

    Some(GridStatistics {
        min: valid_values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
        max: valid_values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        mean: valid_values.iter().sum::<f64>() / valid_values.len() as f64,
        count: valid_values.len(),
    })
}

pub fn print_area_statistics(areas: &[f32]) {
    match grid_statistics(areas) {
        Some(stats) => {
            println!(
                "The areas vary from {:.6} km² to {:.6} km².",
                stats.min, stats.max
            );
            println!(
                "  Mean: {:.6} km² over {} pixels",
                stats.mean, stats.count
            );
        }
        None => println!("There are no pixel areas."),
    }
}

/// Element-wise `|a - b| <= atol + rtol * |b|`.
pub fn all_close(a: &[f32], b: &[f32], rtol: f64, atol: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            (x - y).abs() <= atol + rtol * y.abs()
        })
}

/// Absolute steps between consecutive axis values.
pub fn axis_steps(axis: &[f32]) -> Vec<f64> {
    axis.windows(2)
        .map(|w| (w[1] as f64 - w[0] as f64).abs())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_statistics() {
        let stats = grid_statistics(&[1.0, f32::NAN, 3.0, 2.0]).unwrap();

        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.count, 3);
        assert!(grid_statistics(&[f32::NAN]).is_none());
    }

    #[test]
    fn test_all_close() {
        assert!(all_close(&[60.0, 60.009], &[60.0, 60.009], 1.0e-5, 1.0e-8));
        assert!(all_close(&[60.0004], &[60.0], 1.0e-5, 1.0e-8));
        assert!(!all_close(&[60.01], &[60.0], 1.0e-5, 1.0e-8));
        assert!(!all_close(&[60.0], &[60.0, 60.009], 1.0e-5, 1.0e-8));
    }

    #[test]
    fn test_axis_steps() {
        let steps = axis_steps(&[65.0, 64.5, 64.25]);

        assert_eq!(steps, vec![0.5, 0.25]);
        assert!(axis_steps(&[1.0]).is_empty());
    }
}
