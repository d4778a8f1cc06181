//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
