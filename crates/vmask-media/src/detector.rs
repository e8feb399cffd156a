//! External detector boundary.
//!
//! Locating the target object is not this crate's job: a vision-capable
//! model or a human annotator does it. This trait is the seam; the pipeline
//! invokes it once per run and treats whatever comes back as untrusted
//! region data.

use async_trait::async_trait;
use std::path::Path;

use vmask_models::{DetectionRegion, FrameSample};

use crate::error::MediaResult;

/// A source of detection regions for sampled frames.
///
/// Implementations receive the sampled frames (whose `image_path` artifacts
/// are readable for the duration of the run) and a free-text description of
/// the target, and return regions in source-video pixel space.
#[async_trait]
pub trait RegionDetector: Send + Sync {
    /// Analyze the sampled frames for the described target.
    ///
    /// # Arguments
    /// * `video_path` - the source video the frames came from
    /// * `frames` - sampled frames, ids contiguous from 1
    /// * `target` - what to look for ("the phone on the desk", ...)
    async fn detect(
        &self,
        video_path: &Path,
        frames: &[FrameSample],
        target: &str,
    ) -> MediaResult<Vec<DetectionRegion>>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}
