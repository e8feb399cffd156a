//! Error types for video processing operations.

use thiserror::Error;
use vmask_models::RegionError;

/// Result type for video processing operations.
pub type MediaResult<T> = Result<T, VideoProcessingError>;

/// Errors that can occur while sampling, interpolating or mosaicking video.
///
/// The sampler and the mosaic applier fail fast: the first error aborts the
/// run and propagates unchanged. There is no partial-success return value.
#[derive(Debug, Error)]
pub enum VideoProcessingError {
    /// Input video missing or the codec cannot be opened. Fatal, no retry.
    #[error("Video source unavailable: {0}")]
    SourceUnavailable(String),

    /// Mosaic requested with zero resolvable regions.
    #[error("No regions provided for mosaic processing")]
    NoRegions,

    /// Malformed region JSON or out-of-range bbox on input.
    #[error("Invalid region data: {0}")]
    InvalidRegionData(String),

    /// Writer could not be opened or a frame write failed. Any partial
    /// output file must be treated as invalid.
    #[error("Encode failure: {0}")]
    EncodeFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VideoProcessingError {
    /// Create a source-unavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable(message.into())
    }

    /// Create an invalid-region-data error.
    pub fn invalid_region_data(message: impl Into<String>) -> Self {
        Self::InvalidRegionData(message.into())
    }

    /// Create an encode-failure error.
    pub fn encode_failure(message: impl Into<String>) -> Self {
        Self::EncodeFailure(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<serde_json::Error> for VideoProcessingError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidRegionData(e.to_string())
    }
}

impl From<RegionError> for VideoProcessingError {
    fn from(e: RegionError) -> Self {
        Self::InvalidRegionData(e.to_string())
    }
}
