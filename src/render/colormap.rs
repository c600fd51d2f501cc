//! Colour tables for the rendered grids.

/// Control points `(x, y)` of one channel of matplotlib's "jet".
const JET_RED: [(f64, f64); 5] = [(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: [(f64, f64); 5] = [(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

/// Entries in the quantised lookup table.
const LUT_SIZE: usize = 256;

/// Palette of the land/water mask: water, land, out-of-scope water.
pub const MASK_PALETTE: [[u8; 3]; 3] = [[0, 0, 255], [0, 255, 0], [255, 0, 0]];

fn interpolate(points: &[(f64, f64)], x: f64) -> f64 {
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        }
    }
    points.last().map(|p| p.1).unwrap_or(0.0)
}

/// Maps `value` in [0, 1] to "jet"; values outside are clipped.
pub fn jet(value: f64) -> [u8; 3] {
    let index = ((value * LUT_SIZE as f64) as isize).clamp(0, LUT_SIZE as isize - 1) as usize;
    let x = index as f64 / (LUT_SIZE - 1) as f64;

    [
        (255.0 * interpolate(&JET_RED, x)) as u8,
        (255.0 * interpolate(&JET_GREEN, x)) as u8,
        (255.0 * interpolate(&JET_BLUE, x)) as u8,
    ]
}

/// Diverging blue (0) to red (1) palette.
pub fn cool_warm(value: f64) -> [u8; 3] {
    let color = colorous::RED_BLUE.eval_continuous(1.0 - value.clamp(0.0, 1.0));
    [color.r, color.g, color.b]
}
