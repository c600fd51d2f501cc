use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("end_date cannot be earlier than start_date")]
    DateOrder,
    #[error("Failed to parse date: {0}")]
    DateParse(#[from] chrono::ParseError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("char_width should be greater than 0")]
    CharWidth,
}
