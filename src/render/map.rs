//! Grids rendered as images, one pixel per cell.

use image::{Rgb, RgbImage};

use super::RenderError;
use super::colormap::{MASK_PALETTE, cool_warm, jet};
use crate::readers::types::{LAND, OUT_OF_SCOPE, WATER};
use crate::readers::utils::IceChartStamp;

pub const TITLE: &str = "Baltic Sea - Sea Ice Concentration";
pub const CREDITS: &str = "Credits: E.U. Copernicus Marine Service Information";

/// Text written in the top-left corner of a concentration map.
pub fn overlay_lines(stamp: &IceChartStamp) -> [String; 4] {
    [
        TITLE.to_string(),
        CREDITS.to_string(),
        String::new(),
        stamp.label(),
    ]
}

/// Negative cells are white, the rest "jet" of the concentration fraction.
pub fn concentration_image(conc: &[i16], nlat: usize, nlon: usize) -> RgbImage {
    RgbImage::from_fn(nlon as u32, nlat as u32, |x, y| {
        let c = conc[y as usize * nlon + x as usize];
        if c < 0 {
            Rgb([255, 255, 255])
        } else {
            Rgb(jet(0.01 * c as f64))
        }
    })
}

/// Land/water mask with the palette water, land, out-of-scope water.
pub fn mask_image(conc: &[i16], nlat: usize, nlon: usize) -> Result<RgbImage, RenderError> {
    let mut img = RgbImage::new(nlon as u32, nlat as u32);
    for (i, &c) in conc.iter().enumerate().take(nlat * nlon) {
        let index = match c {
            WATER => 0,
            LAND => 1,
            OUT_OF_SCOPE => 2,
            other => return Err(RenderError::UnexpectedValue(other)),
        };
        img.put_pixel(
            (i % nlon) as u32,
            (i / nlon) as u32,
            Rgb(MASK_PALETTE[index]),
        );
    }
    Ok(img)
}

/// Pixel areas mapped linearly from `lo..hi` km² onto the cool-warm palette.
pub fn area_image(areas: &[f32], rows: usize, cols: usize, lo: f64, hi: f64) -> RgbImage {
    RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
        let area = areas[y as usize * cols + x as usize] as f64;
        // Quantised to 256 levels like an 8-bit paletted image
        let level = (255.0 * (area - lo) / (hi - lo)).clamp(0.0, 255.0) as u8;
        Rgb(cool_warm(level as f64 / 255.0))
    })
}
