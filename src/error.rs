use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::fit::FitError;
use crate::histogram::HistogramError;
use crate::readers::ReadError;
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("fit error: {0}")]
    Fit(#[from] FitError),
    #[error("histogram error: {0}")]
    Histogram(#[from] HistogramError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("{0}")]
    Data(String),
}

pub type Result<T> = std::result::Result<T, Error>;
