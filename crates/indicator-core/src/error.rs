use thiserror::Error;

/// Failure reported by an inbound data supplier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Series not found: {0}")]
    NotFound(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed data: {0}")]
    Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}
