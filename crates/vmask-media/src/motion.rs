//! Frame-diff motion scoring for the sampler's motion gate.
//!
//! Scores are computed at full resolution against the last *emitted* frame:
//! grayscale absolute difference, binary threshold, count of changed pixels.

use opencv::{core, imgproc, prelude::*};

use crate::error::{MediaResult, VideoProcessingError};

/// Pixel intensity change (0-255) that counts as motion.
const PIXEL_DIFF_THRESHOLD: f64 = 30.0;

/// Changed-pixel count below which a candidate frame is considered static.
pub const MOTION_SCORE_THRESHOLD: f64 = 1000.0;

/// Score assumed when motion computation fails, so the frame is kept.
pub const MOTION_FALLBACK_SCORE: f64 = 10_000.0;

/// Motion gate comparing candidate frames against the last emitted frame.
pub struct MotionGate {
    /// Grayscale copy of the last emitted frame.
    prev_gray: Option<Mat>,
}

impl MotionGate {
    pub fn new() -> Self {
        Self { prev_gray: None }
    }

    /// Motion score between the last emitted frame and `frame`, or `None`
    /// before anything has been emitted.
    pub fn score(&self, frame: &Mat) -> MediaResult<Option<f64>> {
        let prev = match &self.prev_gray {
            Some(prev) => prev,
            None => return Ok(None),
        };

        let gray = to_gray(frame)?;

        let mut diff = Mat::default();
        core::absdiff(prev, &gray, &mut diff)
            .map_err(|e| VideoProcessingError::internal(format!("motion absdiff: {e}")))?;

        let mut thresh = Mat::default();
        imgproc::threshold(
            &diff,
            &mut thresh,
            PIXEL_DIFF_THRESHOLD,
            255.0,
            imgproc::THRESH_BINARY,
        )
        .map_err(|e| VideoProcessingError::internal(format!("motion threshold: {e}")))?;

        let motion_pixels = core::count_non_zero(&thresh)
            .map_err(|e| VideoProcessingError::internal(format!("motion count: {e}")))?;

        Ok(Some(motion_pixels as f64))
    }

    /// Record `frame` as the new comparison baseline (call after emitting).
    pub fn commit(&mut self, frame: &Mat) -> MediaResult<()> {
        self.prev_gray = Some(to_gray(frame)?);
        Ok(())
    }
}

impl Default for MotionGate {
    fn default() -> Self {
        Self::new()
    }
}

fn to_gray(frame: &Mat) -> MediaResult<Mat> {
    if frame.channels() == 1 {
        return frame
            .try_clone()
            .map_err(|e| VideoProcessingError::internal(format!("motion clone: {e}")));
    }

    let mut gray = Mat::default();
    imgproc::cvt_color(
        frame,
        &mut gray,
        imgproc::COLOR_BGR2GRAY,
        0,
        core::AlgorithmHint::ALGO_HINT_DEFAULT,
    )
    .map_err(|e| VideoProcessingError::internal(format!("motion bgr2gray: {e}")))?;
    Ok(gray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Rect, Scalar, CV_8UC3};

    fn solid_frame(value: f64) -> Mat {
        Mat::new_rows_cols_with_default(120, 160, CV_8UC3, Scalar::all(value)).unwrap()
    }

    #[test]
    fn test_no_baseline_gives_none() {
        let gate = MotionGate::new();
        assert!(gate.score(&solid_frame(50.0)).unwrap().is_none());
    }

    #[test]
    fn test_identical_frames_score_zero() {
        let mut gate = MotionGate::new();
        let frame = solid_frame(50.0);
        gate.commit(&frame).unwrap();

        let score = gate.score(&frame).unwrap().unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_changed_block_counts_pixels() {
        let mut gate = MotionGate::new();
        gate.commit(&solid_frame(50.0)).unwrap();

        // Paint a 40x40 bright block into an otherwise identical frame
        let mut moved = solid_frame(50.0);
        let mut roi = Mat::roi_mut(&mut moved, Rect::new(10, 10, 40, 40)).unwrap();
        roi.set_to(&Scalar::all(250.0), &opencv::core::no_array()).unwrap();

        let score = gate.score(&moved).unwrap().unwrap();
        assert_eq!(score, 1600.0);
        assert!(score > MOTION_SCORE_THRESHOLD);
    }

    #[test]
    fn test_subtle_change_below_threshold_ignored() {
        let mut gate = MotionGate::new();
        gate.commit(&solid_frame(50.0)).unwrap();

        // +10 intensity everywhere stays under the pixel diff threshold
        let score = gate.score(&solid_frame(60.0)).unwrap().unwrap();
        assert_eq!(score, 0.0);
    }
}
