//! Processing configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a redaction run.
///
/// Plain values only; loading these from the environment or a file is the
/// embedding application's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Extract one candidate frame every N decoded frames (default: 30)
    pub default_sample_rate: u32,

    /// Upper bound on frames handed to the detector per run (default: 20)
    pub max_frames_per_request: u32,

    /// Longest accepted input, in seconds (default: 300)
    pub max_video_duration: f64,

    /// Default pixelation coarseness (default: 15, valid range 5-50)
    pub default_mosaic_strength: u32,

    /// Where finished videos land (default: "output")
    pub output_dir: PathBuf,

    /// Parent directory for run-scoped temp stores (default: "temp")
    pub temp_dir: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            default_sample_rate: 30,
            max_frames_per_request: 20,
            max_video_duration: 300.0,
            default_mosaic_strength: 15,
            output_dir: PathBuf::from("output"),
            temp_dir: PathBuf::from("temp"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.default_sample_rate, 30);
        assert_eq!(config.max_frames_per_request, 20);
        assert_eq!(config.default_mosaic_strength, 15);
    }
}
