//! Operation dispatch error types.

use thiserror::Error;
use vmask_media::VideoProcessingError;
use vmask_session::SessionError;

/// Result type for operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors surfaced at the operation boundary.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error(transparent)]
    Media(#[from] VideoProcessingError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OpsError {
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownOperation(name.into())
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }
}
