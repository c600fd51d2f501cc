pub mod animation;
pub mod colormap;
pub mod font_strip;
pub mod frame;
pub mod map;
pub mod plots;

pub use font_strip::FontStrip;

use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("gif error: {0}")]
    Gif(#[from] gif::EncodingError),
    #[error("plot error: {0}")]
    Plot(String),
    #[error("{0} is not an expected value")]
    UnexpectedValue(i16),
    #[error("character {0:?} is not in the font strip")]
    UnknownCharacter(char),
    #[error("could not load font")]
    Font,
    #[error("{path} is {found:?} but the first frame is {expected:?}")]
    FrameSize {
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("frames are too large for a GIF ({0} x {1})")]
    GifSize(u32, u32),
    #[error("no frames to animate")]
    NoFrames,
    #[error("{command} failed: {message}")]
    Subprocess { command: String, message: String },
    #[error("{command} timed out after {seconds} s")]
    Timeout { command: String, seconds: f64 },
}

pub(crate) fn plot_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Plot(err.to_string())
}

pub fn open_rgb(path: &Path) -> Result<RgbImage, RenderError> {
    Ok(image::open(path)?.to_rgb8())
}

pub fn save_png(img: &RgbImage, path: &Path) -> Result<(), RenderError> {
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}
