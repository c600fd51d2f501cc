use super::{LonLat, WGS84_A, WGS84_B, WGS84_F};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inverse {
    /// Geodesic distance [m].
    pub distance: f64,
    pub iterations: u32,
    pub converged: bool,
}

/// Vincenty's inverse formula.
///
/// Iterates on the longitude difference on the auxiliary sphere until it changes by no more
/// than `eps` [rad] or `n_iter` iterations have been made. When the iteration cap is hit the
/// last iterate is used and `converged` is false.
pub fn inverse(p1: LonLat, p2: LonLat, eps: f64, n_iter: u32) -> Inverse {
    let (lon1, lat1) = p1;
    let (lon2, lat2) = p2;

    let l = (lon2 - lon1).to_radians();
    let u1 = ((1.0 - WGS84_F) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * lat2.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut sin_sigma = 0.0;
    let mut cos_sigma = 1.0;
    let mut sigma = 0.0;
    let mut cos_sq_alpha = 1.0;
    let mut cos_2sigma_m = 0.0;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < n_iter.max(1) {
        iterations += 1;

        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();

        // Coincident points
        if sin_sigma == 0.0 {
            return Inverse {
                distance: 0.0,
                iterations,
                converged: true,
            };
        }

        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        // Equatorial lines have cos²α = 0
        cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - previous).abs() <= eps {
            converged = true;
            break;
        }
    }

    let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = b
        * sin_sigma
        * (cos_2sigma_m
            + b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    Inverse {
        distance: WGS84_B * a * (sigma - delta_sigma),
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1.0e-12;
    const N_ITER: u32 = 1_000_000;

    #[test]
    fn test_equator_degree() {
        let result = inverse((0.0, 0.0), (1.0, 0.0), EPS, N_ITER);

        assert!(result.converged);
        assert!((result.distance - WGS84_A.to_radians()).abs() < 1.0e-3);
    }

    #[test]
    fn test_meridian_degree() {
        // Meridian arc from the equator to 1°N
        let result = inverse((0.0, 0.0), (0.0, 1.0), EPS, N_ITER);

        assert!(result.converged);
        assert!((result.distance - 110_574.39).abs() < 0.5);
    }

    #[test]
    fn test_coincident_points() {
        let result = inverse((20.0, 60.0), (20.0, 60.0), EPS, N_ITER);

        assert_eq!(result.distance, 0.0);
        assert!(result.converged);
    }

    #[test]
    fn test_symmetry() {
        let forward = inverse((18.5, 59.3), (24.9, 60.2), EPS, N_ITER);
        let backward = inverse((24.9, 60.2), (18.5, 59.3), EPS, N_ITER);

        assert!((forward.distance - backward.distance).abs() < 1.0e-6);
        // Stockholm to Helsinki is a little under 400 km
        assert!((350_000.0..400_000.0).contains(&forward.distance));
    }

    #[test]
    fn test_iteration_cap_returns_last_iterate() {
        let capped = inverse((0.0, 0.0), (10.0, 10.0), EPS, 1);
        let full = inverse((0.0, 0.0), (10.0, 10.0), EPS, N_ITER);

        assert!(!capped.converged);
        assert_eq!(capped.iterations, 1);
        assert!(capped.distance.is_finite());
        assert!((capped.distance - full.distance).abs() / full.distance < 1.0e-2);
    }
}
