//! Sampled frame metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single frame selected by the sampler and saved as an image artifact.
///
/// Frame ids are assigned sequentially starting at 1 in extraction order.
/// The image artifact lives in the run-scoped frame directory and is named
/// `frame_{frame_id}.jpg`, so downstream stages can locate it without an
/// index. Samples are immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameSample {
    /// Sequential frame id (1-based, no gaps)
    pub frame_id: u32,

    /// Timestamp in seconds (`decoded_index / fps`)
    pub timestamp: f64,

    /// Path to the saved frame image
    pub image_path: PathBuf,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,
}

impl FrameSample {
    /// Deterministic artifact file name for a frame id.
    pub fn artifact_name(frame_id: u32) -> String {
        format!("frame_{frame_id}.jpg")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name() {
        assert_eq!(FrameSample::artifact_name(1), "frame_1.jpg");
        assert_eq!(FrameSample::artifact_name(42), "frame_42.jpg");
    }

    #[test]
    fn test_serde_roundtrip() {
        let sample = FrameSample {
            frame_id: 3,
            timestamp: 2.5,
            image_path: PathBuf::from("/tmp/frames/frame_3.jpg"),
            width: 1920,
            height: 1080,
        };

        let json = serde_json::to_string(&sample).unwrap();
        let back: FrameSample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }
}
