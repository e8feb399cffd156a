//! Motion-adaptive frame sampling.

use opencv::{imgcodecs, prelude::*, videoio};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use vmask_models::FrameSample;

use crate::context::RunContext;
use crate::error::{MediaResult, VideoProcessingError};
use crate::motion::{MotionGate, MOTION_FALLBACK_SCORE, MOTION_SCORE_THRESHOLD};

/// Options for frame extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleOptions {
    /// A decoded frame is a candidate every `sample_rate` frames
    pub sample_rate: u32,

    /// Stop after this many emitted frames
    pub max_frames: u32,

    /// Reject candidates that look like the last emitted frame
    pub motion_aware: bool,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            sample_rate: 30,
            max_frames: 20,
            motion_aware: true,
        }
    }
}

/// Walk the video and emit a bounded, motion-aware subset of frames.
///
/// Frame ids are contiguous from 1 in emission order; timestamps are
/// `decoded_index / fps`. Each emitted frame is saved as
/// `frame_{id}.jpg` in the context's frame directory.
///
/// When `motion_aware` is set, a candidate whose motion score against the
/// last emitted frame falls below the threshold is skipped; the very first
/// candidate is always kept. A completely static video therefore degenerates
/// to exactly one emitted frame. A stream with fewer viable frames than
/// `max_frames` yields a shorter sequence, which is not an error.
pub fn extract_frames(
    video_path: &Path,
    options: &SampleOptions,
    ctx: &RunContext,
) -> MediaResult<Vec<FrameSample>> {
    if !video_path.exists() {
        return Err(VideoProcessingError::source_unavailable(format!(
            "Video file not found: {}",
            video_path.display()
        )));
    }

    let mut cap =
        videoio::VideoCapture::from_file(video_path.to_str().unwrap_or(""), videoio::CAP_ANY)
            .map_err(|e| VideoProcessingError::source_unavailable(format!("Open video: {e}")))?;

    if !cap.is_opened().unwrap_or(false) {
        return Err(VideoProcessingError::source_unavailable(format!(
            "Cannot open video file: {}",
            video_path.display()
        )));
    }

    let fps = cap
        .get(videoio::CAP_PROP_FPS)
        .map_err(|e| VideoProcessingError::internal(format!("Read fps: {e}")))?;
    let fps = if fps > 0.0 { fps } else { 30.0 };

    let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0) as u32;
    let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0) as u32;

    let sample_rate = options.sample_rate.max(1) as u64;
    let frames_dir = ctx.frames_dir();

    let mut gate = MotionGate::new();
    let mut samples: Vec<FrameSample> = Vec::new();
    let mut decoded_index: u64 = 0;
    let mut frame = Mat::default();

    while (samples.len() as u32) < options.max_frames {
        let read_ok = cap
            .read(&mut frame)
            .map_err(|e| VideoProcessingError::internal(format!("Read frame: {e}")))?;
        if !read_ok || frame.empty() {
            break;
        }

        if decoded_index % sample_rate == 0 {
            let keep = if options.motion_aware && !samples.is_empty() {
                let score = match gate.score(&frame) {
                    Ok(Some(score)) => score,
                    // No baseline yet, or scoring failed: keep the frame.
                    Ok(None) => MOTION_FALLBACK_SCORE,
                    Err(e) => {
                        debug!(frame = decoded_index, error = %e, "Motion score failed");
                        MOTION_FALLBACK_SCORE
                    }
                };

                if score < MOTION_SCORE_THRESHOLD {
                    debug!(frame = decoded_index, score, "Static candidate skipped");
                    false
                } else {
                    true
                }
            } else {
                true
            };

            if keep {
                let frame_id = samples.len() as u32 + 1;
                let image_path = frames_dir.join(FrameSample::artifact_name(frame_id));

                let written = imgcodecs::imwrite(
                    image_path.to_str().unwrap_or(""),
                    &frame,
                    &opencv::core::Vector::new(),
                )
                .map_err(|e| VideoProcessingError::internal(format!("Write frame: {e}")))?;
                if !written {
                    return Err(VideoProcessingError::internal(format!(
                        "Failed to write frame artifact: {}",
                        image_path.display()
                    )));
                }

                samples.push(FrameSample {
                    frame_id,
                    timestamp: decoded_index as f64 / fps,
                    image_path,
                    width,
                    height,
                });

                if options.motion_aware {
                    gate.commit(&frame)?;
                }
            }
        }

        decoded_index += 1;
    }

    info!(
        video = %video_path.display(),
        extracted = samples.len(),
        decoded = decoded_index,
        "Frame extraction complete"
    );

    Ok(samples)
}
