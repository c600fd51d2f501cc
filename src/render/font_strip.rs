//! Bitmap text from a horizontal strip of fixed-width glyphs.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};
use std::path::Path;

use super::RenderError;

/// The glyphs of the strip, in order: digits, letters, punctuation, whitespace.
pub const PRINTABLE: &str = concat!(
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
    " \t\n\r\x0b\x0c",
);

pub const STRIP_HEIGHT: u32 = 21;
pub const FONT_SIZE: f32 = 16.0;

pub fn glyph_index(c: char) -> Option<usize> {
    PRINTABLE.chars().position(|p| p == c)
}

/// Draws every printable glyph in black on white, `char_width` pixels apart.
pub fn render_strip(font_data: &[u8], char_width: u32) -> Result<RgbImage, RenderError> {
    let font = Font::try_from_vec(font_data.to_vec()).ok_or(RenderError::Font)?;
    let scale = Scale::uniform(FONT_SIZE);

    let count = PRINTABLE.chars().count() as u32;
    let mut strip = RgbImage::from_pixel(char_width * count, STRIP_HEIGHT, Rgb([255, 255, 255]));

    for (i, c) in PRINTABLE.chars().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        draw_text_mut(
            &mut strip,
            Rgb([0, 0, 0]),
            (i as u32 * char_width) as i32,
            0,
            scale,
            &font,
            &c.to_string(),
        );
    }

    Ok(strip)
}

pub struct FontStrip {
    image: RgbImage,
    char_width: u32,
}

impl FontStrip {
    pub fn new(image: RgbImage, char_width: u32) -> Self {
        Self { image, char_width }
    }

    pub fn open(path: &Path, char_width: u32) -> Result<Self, RenderError> {
        Ok(Self::new(super::open_rgb(path)?, char_width))
    }

    pub fn glyph_height(&self) -> u32 {
        self.image.height()
    }

    /// Copies one glyph with its top-left corner at (x, y), clipped to the target.
    pub fn draw_char(
        &self,
        target: &mut RgbImage,
        c: char,
        x: u32,
        y: u32,
    ) -> Result<(), RenderError> {
        let index = glyph_index(c).ok_or(RenderError::UnknownCharacter(c))? as u32;
        let x0 = index * self.char_width;
        if x0 + self.char_width > self.image.width() {
            return Err(RenderError::UnknownCharacter(c));
        }

        for dy in 0..self.glyph_height() {
            for dx in 0..self.char_width {
                let (tx, ty) = (x + dx, y + dy);
                if tx < target.width() && ty < target.height() {
                    target.put_pixel(tx, ty, *self.image.get_pixel(x0 + dx, dy));
                }
            }
        }
        Ok(())
    }

    /// Writes each line one glyph-height below the previous, starting 1 px in from the corner.
    pub fn overlay(&self, target: &mut RgbImage, lines: &[&str]) -> Result<(), RenderError> {
        for (i, line) in lines.iter().enumerate() {
            let y = 1 + i as u32 * self.glyph_height();
            for (j, c) in line.chars().enumerate() {
                let x = 1 + j as u32 * self.char_width;
                self.draw_char(target, c, x, y)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each glyph cell is filled with its own index as the red channel
    fn indexed_strip(char_width: u32, height: u32) -> FontStrip {
        let count = PRINTABLE.chars().count() as u32;
        let image = RgbImage::from_fn(char_width * count, height, |x, _| {
            Rgb([(x / char_width) as u8, 7, 7])
        });
        FontStrip::new(image, char_width)
    }

    #[test]
    fn test_printable_layout() {
        assert_eq!(PRINTABLE.chars().count(), 100);
        assert_eq!(glyph_index('0'), Some(0));
        assert_eq!(glyph_index('a'), Some(10));
        assert_eq!(glyph_index('A'), Some(36));
        assert_eq!(glyph_index(' '), Some(94));
        assert_eq!(glyph_index('é'), None);
    }

    #[test]
    fn test_overlay_positions() {
        let strip = indexed_strip(4, 3);
        let mut target = RgbImage::from_pixel(40, 10, Rgb([255, 255, 255]));

        strip.overlay(&mut target, &["1a", "", "-"]).unwrap();

        // First line starts at (1, 1)
        assert_eq!(target.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(target.get_pixel(1, 1), &Rgb([1, 7, 7]));
        assert_eq!(target.get_pixel(5, 3), &Rgb([10, 7, 7]));
        // Third line is two glyph heights lower
        let dash = glyph_index('-').unwrap() as u8;
        assert_eq!(target.get_pixel(2, 7), &Rgb([dash, 7, 7]));
        assert_eq!(target.get_pixel(9, 1), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_overlay_clips_at_edges() {
        let strip = indexed_strip(4, 3);
        let mut target = RgbImage::from_pixel(6, 2, Rgb([255, 255, 255]));

        strip.overlay(&mut target, &["00"]).unwrap();

        assert_eq!(target.get_pixel(5, 1), &Rgb([0, 7, 7]));
    }

    #[test]
    fn test_unknown_character() {
        let strip = indexed_strip(4, 3);
        let mut target = RgbImage::new(10, 10);

        assert!(matches!(
            strip.overlay(&mut target, &["°"]),
            Err(RenderError::UnknownCharacter('°'))
        ));
    }
}
