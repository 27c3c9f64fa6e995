//! Centralized error types for rxboard.

use thiserror::Error;

/// Main error type for rxboard operations.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Store error: {0}")]
    Store(#[from] rxboard_redis::RedisError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Announcement failed: {0}")]
    Announce(String),

    #[error("Display server rejected request: {status} {message}")]
    Rejected { status: u16, message: String },
}

/// Result type for rxboard operations.
pub type BoardResult<T> = Result<T, BoardError>;

impl BoardError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create an unavailable-store error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
