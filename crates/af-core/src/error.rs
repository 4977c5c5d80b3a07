//! Error types for ArcadeForge

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Invalid tier: {0}")]
    InvalidTier(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type CoreResult<T> = Result<T, CoreError>;
