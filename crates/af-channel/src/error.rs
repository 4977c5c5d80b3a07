//! Channel errors

use thiserror::Error;

/// Rejections from wire validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Invalid payload for '{event}': {reason}")]
    InvalidPayload { event: String, reason: String },

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Malformed message: {0}")]
    Malformed(String),
}

/// Result type alias
pub type ChannelResult<T> = Result<T, ChannelError>;
