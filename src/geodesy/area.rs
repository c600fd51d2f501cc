use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use super::LonLat;
use super::vincenty;

/// Settings for the geodesic area calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaParams {
    /// Convergence tolerance of the Vincenty iterations [rad].
    pub eps: f64,
    /// Number of levels each triangle is split into; 1 means no splitting.
    pub level: u32,
    /// Maximum number of Vincenty iterations.
    pub n_iter: u32,
}

impl Default for AreaParams {
    fn default() -> Self {
        Self {
            eps: 1.0e-12,
            level: 1,
            n_iter: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PolygonArea {
    /// Area [m²].
    pub area: f64,
    /// Number of side lengths whose Vincenty iteration hit the cap.
    pub unconverged: u32,
    /// Most Vincenty iterations needed by any side.
    pub max_iterations: u32,
}

impl PolygonArea {
    fn add(&mut self, other: PolygonArea) {
        self.area += other.area;
        self.unconverged += other.unconverged;
        self.max_iterations = self.max_iterations.max(other.max_iterations);
    }
}

fn side(p1: LonLat, p2: LonLat, params: &AreaParams, tally: &mut PolygonArea) -> f64 {
    let result = vincenty::inverse(p1, p2, params.eps, params.n_iter);
    if !result.converged {
        tally.unconverged += 1;
    }
    tally.max_iterations = tally.max_iterations.max(result.iterations);
    result.distance
}

// Heron's formula in the form that stays accurate for needle-shaped triangles
fn heron(a: f64, b: f64, c: f64) -> f64 {
    let mut sides = [a, b, c];
    sides.sort_by(|x, y| y.total_cmp(x));
    let [a, b, c] = sides;

    let product = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
    0.25 * product.max(0.0).sqrt()
}

fn midpoint(p1: LonLat, p2: LonLat) -> LonLat {
    (0.5 * (p1.0 + p2.0), 0.5 * (p1.1 + p2.1))
}

fn triangle_area(triangle: [LonLat; 3], level: u32, params: &AreaParams) -> PolygonArea {
    let [p0, p1, p2] = triangle;

    if level <= 1 {
        let mut tally = PolygonArea::default();
        let a = side(p0, p1, params, &mut tally);
        let b = side(p1, p2, params, &mut tally);
        let c = side(p2, p0, params, &mut tally);
        tally.area = heron(a, b, c);
        return tally;
    }

    let m01 = midpoint(p0, p1);
    let m12 = midpoint(p1, p2);
    let m20 = midpoint(p2, p0);

    let mut total = PolygonArea::default();
    for child in [
        [p0, m01, m20],
        [m01, p1, m12],
        [m20, m12, p2],
        [m01, m12, m20],
    ] {
        total.add(triangle_area(child, level - 1, params));
    }
    total
}

/// Area of a convex ring of (lon, lat) vertices [m²].
///
/// The ring may or may not repeat its first vertex at the end. It is fanned into triangles from
/// the first vertex and every triangle is split `level - 1` times into four.
pub fn polygon_area(ring: &[LonLat], params: &AreaParams) -> PolygonArea {
    let mut vertices = ring;
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices = &vertices[..vertices.len() - 1];
    }

    let mut total = PolygonArea::default();
    if vertices.len() < 3 {
        return total;
    }

    for i in 1..vertices.len() - 1 {
        total.add(triangle_area(
            [vertices[0], vertices[i], vertices[i + 1]],
            params.level,
            params,
        ));
    }
    total
}

/// Area of the pixel whose corners are consecutive axis values [m²].
pub fn pixel_area(
    lat: &[f32],
    lon: &[f32],
    i_lat: usize,
    i_lon: usize,
    params: &AreaParams,
) -> PolygonArea {
    let (lat0, lat1) = (lat[i_lat] as f64, lat[i_lat + 1] as f64);
    let (lon0, lon1) = (lon[i_lon] as f64, lon[i_lon + 1] as f64);

    polygon_area(
        &[
            (lon0, lat0),
            (lon0, lat1),
            (lon1, lat1),
            (lon1, lat0),
            (lon0, lat0),
        ],
        params,
    )
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let template = "  {percent:>3}% (~{eta} still to go) [{bar:40.cyan/blue}]";
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}

/// Areas of every pixel of a grid, row-major `(lat.len() - 1, lon.len() - 1)` [km²].
pub fn pixel_areas(lat: &[f32], lon: &[f32], params: &AreaParams) -> Vec<f32> {
    let rows = lat.len().saturating_sub(1);
    let cols = lon.len().saturating_sub(1);

    info!(
        "Calculating the area of {} x {} pixels (level {}) ...",
        rows, cols, params.level
    );

    let pb = progress_bar(rows as u64);
    let mut areas = Vec::with_capacity(rows * cols);
    let mut unconverged = 0u64;
    let mut max_iterations = 0;

    for i_lat in 0..rows {
        for i_lon in 0..cols {
            let pixel = pixel_area(lat, lon, i_lat, i_lon, params);
            unconverged += pixel.unconverged as u64;
            max_iterations = max_iterations.max(pixel.max_iterations);
            areas.push((pixel.area / 1.0e6) as f32);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    debug!("The Vincenty formula needed at most {} iterations", max_iterations);

    if unconverged > 0 {
        warn!(
            "{} pixel sides did not converge within {} iterations",
            unconverged, params.n_iter
        );
    }

    areas
}
