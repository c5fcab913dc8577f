//! Error types for vodprep-sprite.

use thiserror::Error;

/// Result type for vodprep-sprite operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for vodprep-sprite operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The descriptor violates a structural constraint.
    #[error("Invalid sprite metadata: {0}")]
    InvalidMetadata(String),

    /// The descriptor is not valid JSON or is missing fields.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid metadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }
}
