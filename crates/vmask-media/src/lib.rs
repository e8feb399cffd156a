#![deny(unreachable_patterns)]
//! Video operations for the VideoMask redaction pipeline.
//!
//! This crate provides:
//! - Motion-adaptive frame sampling with run-scoped image artifacts
//! - Nearest-keyframe region resolution
//! - Pixel-region mosaic application with stream-property preservation
//! - FFprobe metadata probing
//! - The external-detector trait boundary and the run pipeline tying the
//!   stages together
//!
//! Execution is single-threaded and strictly sequential per video: one
//! decode handle, frames in increasing order, one encode handle. Runs never
//! share state; each owns its [`context::RunContext`].

pub mod config;
pub mod context;
pub mod detector;
pub mod error;
pub mod fs_utils;
pub mod interpolate;
pub mod mosaic;
pub mod motion;
pub mod pipeline;
pub mod probe;
pub mod sampler;

pub use config::ProcessorConfig;
pub use context::RunContext;
pub use detector::RegionDetector;
pub use error::{MediaResult, VideoProcessingError};
pub use interpolate::RegionInterpolator;
pub use mosaic::{
    apply_mosaic, mosaic_frame_regions, MosaicOptions, MAX_MOSAIC_STRENGTH, MIN_MOSAIC_STRENGTH,
};
pub use pipeline::{run_redaction, RedactionOutcome};
pub use probe::{
    get_duration, probe_video, RECOMMENDED_FORMAT, SUPPORTED_INPUT_FORMATS,
    SUPPORTED_OUTPUT_FORMATS,
};
pub use sampler::{extract_frames, SampleOptions};

#[cfg(test)]
pub(crate) mod test_support {
    //! Synthetic video fixtures for tests. Encoders depend on the local
    //! OpenCV build; helpers return `false` when no backend is available so
    //! tests can skip instead of failing on a codec-less machine.

    use opencv::{
        core::{Mat, Rect, Scalar, Size, Vec3b, CV_8UC3},
        prelude::*,
        videoio::VideoWriter,
    };
    use std::path::Path;

    pub(crate) const TEST_W: i32 = 160;
    pub(crate) const TEST_H: i32 = 120;

    fn open_writer(path: &Path, fps: f64) -> Option<VideoWriter> {
        let fourcc = VideoWriter::fourcc('M', 'J', 'P', 'G').ok()?;
        let writer = VideoWriter::new(
            path.to_str()?,
            fourcc,
            fps,
            Size::new(TEST_W, TEST_H),
            true,
        )
        .ok()?;
        writer.is_opened().ok()?.then_some(writer)
    }

    /// Identical frames throughout.
    pub(crate) fn static_video(path: &Path, frames: u32, fps: f64) -> bool {
        let Some(mut writer) = open_writer(path, fps) else {
            return false;
        };
        let frame =
            Mat::new_rows_cols_with_default(TEST_H, TEST_W, CV_8UC3, Scalar::all(90.0)).unwrap();
        for _ in 0..frames {
            if writer.write(&frame).is_err() {
                return false;
            }
        }
        writer.release().is_ok()
    }

    /// A bright block sweeping over a dark background.
    pub(crate) fn sweeping_video(path: &Path, frames: u32, fps: f64) -> bool {
        let Some(mut writer) = open_writer(path, fps) else {
            return false;
        };
        for i in 0..frames as i32 {
            let mut frame =
                Mat::new_rows_cols_with_default(TEST_H, TEST_W, CV_8UC3, Scalar::all(30.0))
                    .unwrap();
            let x = (i * 7) % (TEST_W - 40);
            let y = (i * 3) % (TEST_H - 40);
            let mut roi = Mat::roi_mut(&mut frame, Rect::new(x, y, 40, 40)).unwrap();
            roi.set_to(&Scalar::new(220.0, 60.0, 140.0, 0.0), &opencv::core::no_array())
                .unwrap();
            if writer.write(&frame).is_err() {
                return false;
            }
        }
        writer.release().is_ok()
    }

    /// A textured frame where mosaicking visibly changes pixels.
    pub(crate) fn gradient_frame(rows: i32, cols: i32) -> Mat {
        let mut frame =
            Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::all(0.0)).unwrap();
        for r in 0..rows {
            for c in 0..cols {
                *frame.at_2d_mut::<Vec3b>(r, c).unwrap() =
                    Vec3b::from([(r * 2) as u8, (c * 2) as u8, ((r + c) % 256) as u8]);
            }
        }
        frame
    }

}
