//! Probed video metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Video file information.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Total number of frames
    pub frame_count: u64,
    /// Video codec
    pub codec: String,
    /// File size in bytes
    pub size: u64,
    /// Bitrate in bits/second
    pub bitrate: u64,
}

impl VideoInfo {
    /// "WxH" resolution string.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Frame area in pixels.
    pub fn frame_area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// File size in mebibytes, rounded to two decimals.
    pub fn size_mb(&self) -> f64 {
        (self.size as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
    }
}
