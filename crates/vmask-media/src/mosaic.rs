//! Mosaic (pixelation) application.

use opencv::{
    core::{Rect, Size},
    imgproc,
    prelude::*,
    videoio,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use vmask_models::{DetectionRegion, RegionTable};

use crate::context::RunContext;
use crate::error::{MediaResult, VideoProcessingError};
use crate::fs_utils::move_into_place;
use crate::interpolate::RegionInterpolator;

/// Smallest accepted pixelation coarseness.
pub const MIN_MOSAIC_STRENGTH: u32 = 5;

/// Largest accepted pixelation coarseness.
pub const MAX_MOSAIC_STRENGTH: u32 = 50;

/// Options for mosaic application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MosaicOptions {
    /// Pixelation coarseness, clamped to [5, 50]
    pub strength: u32,
}

impl MosaicOptions {
    /// Create options, clamping `strength` into the valid range.
    pub fn new(strength: u32) -> Self {
        Self {
            strength: strength.clamp(MIN_MOSAIC_STRENGTH, MAX_MOSAIC_STRENGTH),
        }
    }
}

impl Default for MosaicOptions {
    fn default() -> Self {
        Self::new(15)
    }
}

/// Mosaic block size for a region: `min(strength, min(w, h) / 2)`, at
/// least 1.
fn block_size(strength: u32, width: i32, height: i32) -> i32 {
    (strength as i32).min(width.min(height) / 2).max(1)
}

/// Pixelate every region in place on one frame.
///
/// Each bbox is clamped into the frame before use. Regions are applied in
/// list order; an overlapping region reads the already-mosaicked pixels of
/// its predecessors.
pub fn mosaic_frame_regions(
    frame: &mut Mat,
    regions: &[DetectionRegion],
    strength: u32,
) -> MediaResult<()> {
    let frame_width = frame.cols() as u32;
    let frame_height = frame.rows() as u32;

    for region in regions {
        let bbox = region.bbox.clamp_to(frame_width, frame_height);
        let rect = Rect::new(bbox.x, bbox.y, bbox.width, bbox.height);

        let roi = Mat::roi(frame, rect)
            .map_err(|e| VideoProcessingError::internal(format!("mosaic roi: {e}")))?
            .try_clone()
            .map_err(|e| VideoProcessingError::internal(format!("mosaic roi clone: {e}")))?;

        let block = block_size(strength, bbox.width, bbox.height);

        let mut small = Mat::default();
        imgproc::resize(
            &roi,
            &mut small,
            Size::new(block, block),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(|e| VideoProcessingError::internal(format!("mosaic downsample: {e}")))?;

        let mut mosaic = Mat::default();
        imgproc::resize(
            &small,
            &mut mosaic,
            Size::new(bbox.width, bbox.height),
            0.0,
            0.0,
            imgproc::INTER_NEAREST,
        )
        .map_err(|e| VideoProcessingError::internal(format!("mosaic upsample: {e}")))?;

        let mut target = Mat::roi_mut(frame, rect)
            .map_err(|e| VideoProcessingError::internal(format!("mosaic target roi: {e}")))?;
        mosaic
            .copy_to(&mut target)
            .map_err(|e| VideoProcessingError::internal(format!("mosaic write-back: {e}")))?;
    }

    Ok(())
}

/// Rewrite `video_path` with every resolved region pixelated.
///
/// The output keeps the input's frame count, resolution and frame rate and
/// is re-encoded as mp4. Frames without an exact keyframe entry resolve
/// through the nearest-keyframe policy. The encoded stream goes to a
/// temporary path first and is moved into place only after the final frame
/// is written, so a failed run never leaves a partial file at the
/// destination.
///
/// An empty region table is a caller error ([`VideoProcessingError::NoRegions`]),
/// raised before any decode work begins.
pub async fn apply_mosaic(
    video_path: &Path,
    table: &RegionTable,
    options: MosaicOptions,
    ctx: &RunContext,
) -> MediaResult<PathBuf> {
    if table.is_empty() {
        return Err(VideoProcessingError::NoRegions);
    }

    if !video_path.exists() {
        return Err(VideoProcessingError::source_unavailable(format!(
            "Video file not found: {}",
            video_path.display()
        )));
    }

    let output_path = ctx.output_path_for(video_path);
    let staging_path = ctx.temp_path().join(
        output_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("mosaic.mp4")),
    );

    let frames_written = encode_mosaic(video_path, &staging_path, table, options)?;

    move_into_place(&staging_path, &output_path).await?;

    info!(
        video = %video_path.display(),
        output = %output_path.display(),
        frames = frames_written,
        strength = options.strength,
        "Mosaic application complete"
    );

    Ok(output_path)
}

/// Synchronous decode/transform/encode loop.
fn encode_mosaic(
    video_path: &Path,
    staging_path: &Path,
    table: &RegionTable,
    options: MosaicOptions,
) -> MediaResult<u64> {
    let mut cap =
        videoio::VideoCapture::from_file(video_path.to_str().unwrap_or(""), videoio::CAP_ANY)
            .map_err(|e| VideoProcessingError::source_unavailable(format!("Open video: {e}")))?;

    if !cap.is_opened().unwrap_or(false) {
        return Err(VideoProcessingError::source_unavailable(format!(
            "Cannot open video file: {}",
            video_path.display()
        )));
    }

    let fps = cap.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
    let fps = if fps > 0.0 { fps } else { 30.0 };
    let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0) as i32;
    let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0) as i32;

    let fourcc = videoio::VideoWriter::fourcc('m', 'p', '4', 'v')
        .map_err(|e| VideoProcessingError::encode_failure(format!("mp4v fourcc: {e}")))?;
    let mut writer = videoio::VideoWriter::new(
        staging_path.to_str().unwrap_or(""),
        fourcc,
        fps,
        Size::new(width, height),
        true,
    )
    .map_err(|e| VideoProcessingError::encode_failure(format!("Open writer: {e}")))?;

    if !writer.is_opened().unwrap_or(false) {
        return Err(VideoProcessingError::encode_failure(format!(
            "Cannot open video writer: {}",
            staging_path.display()
        )));
    }

    let interpolator = RegionInterpolator::new(table);
    let mut decoded_index: u64 = 0;
    let mut frame = Mat::default();

    loop {
        let read_ok = cap
            .read(&mut frame)
            .map_err(|e| VideoProcessingError::internal(format!("Read frame: {e}")))?;
        if !read_ok || frame.empty() {
            break;
        }

        // Decoded frames map 1-based and gapless onto detection frame ids.
        let frame_id = (decoded_index + 1).min(u32::MAX as u64) as u32;
        let regions = interpolator.resolve(frame_id);
        if !regions.is_empty() {
            mosaic_frame_regions(&mut frame, regions, options.strength)?;
        }

        writer
            .write(&frame)
            .map_err(|e| VideoProcessingError::encode_failure(format!("Write frame: {e}")))?;
        decoded_index += 1;
    }

    writer
        .release()
        .map_err(|e| VideoProcessingError::encode_failure(format!("Finalize writer: {e}")))?;

    debug!(frames = decoded_index, "Mosaic encode finished");
    Ok(decoded_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessorConfig;
    use crate::test_support::{gradient_frame, sweeping_video};
    use tempfile::TempDir;
    use vmask_models::BBox;

    fn region(frame_id: u32, bbox: BBox) -> DetectionRegion {
        DetectionRegion::new(frame_id, "phone", bbox, 1.0, "", None).unwrap()
    }

    fn test_ctx() -> (TempDir, RunContext) {
        let root = TempDir::new().unwrap();
        let config = ProcessorConfig {
            output_dir: root.path().join("out"),
            temp_dir: root.path().join("tmp"),
            ..ProcessorConfig::default()
        };
        let ctx = RunContext::create(config).unwrap();
        (root, ctx)
    }

    fn roi_mean(frame: &Mat, bbox: BBox) -> f64 {
        let rect = Rect::new(bbox.x, bbox.y, bbox.width, bbox.height);
        let roi = Mat::roi(frame, rect).unwrap();
        let mean = opencv::core::mean(&roi, &opencv::core::no_array()).unwrap();
        (mean[0] + mean[1] + mean[2]) / 3.0
    }

    #[test]
    fn test_block_size() {
        assert_eq!(block_size(15, 100, 100), 15);
        assert_eq!(block_size(15, 20, 100), 10); // min(w,h)/2 caps it
        assert_eq!(block_size(15, 1, 1), 1); // never below 1
        assert_eq!(block_size(50, 8, 8), 4);
    }

    #[test]
    fn test_strength_clamped() {
        assert_eq!(MosaicOptions::new(0).strength, MIN_MOSAIC_STRENGTH);
        assert_eq!(MosaicOptions::new(200).strength, MAX_MOSAIC_STRENGTH);
        assert_eq!(MosaicOptions::new(15).strength, 15);
    }

    #[test]
    fn test_mosaic_changes_roi_pixels() {
        let mut frame = gradient_frame(120, 160);
        let original = frame.try_clone().unwrap();
        let bbox = BBox::new(20, 20, 60, 60);

        mosaic_frame_regions(&mut frame, &[region(1, bbox)], 10).unwrap();

        let mut diff = Mat::default();
        opencv::core::absdiff(&original, &frame, &mut diff).unwrap();
        assert!(roi_mean(&diff, bbox) > 1.0, "mosaic produced no visible change");

        // Pixels outside the region are untouched
        let outside = BBox::new(100, 90, 40, 20);
        assert_eq!(roi_mean(&diff, outside), 0.0);
    }

    #[test]
    fn test_oversized_bbox_fully_clamped() {
        let mut frame = gradient_frame(120, 160);
        // 10000x10000 on a small frame clamps to the whole frame, no panic
        mosaic_frame_regions(&mut frame, &[region(1, BBox::new(0, 0, 10_000, 10_000))], 10)
            .unwrap();
    }

    #[test]
    fn test_overlapping_regions_apply_sequentially() {
        // Applying [a, b] must differ from [b, a]: the later region reads
        // the earlier one's mosaicked pixels.
        let a = region(1, BBox::new(10, 10, 60, 60));
        let b = region(1, BBox::new(40, 40, 60, 60));

        let mut ab = gradient_frame(120, 160);
        mosaic_frame_regions(&mut ab, &[a.clone(), b.clone()], 7).unwrap();

        let mut ba = gradient_frame(120, 160);
        mosaic_frame_regions(&mut ba, &[b, a], 7).unwrap();

        let mut diff = Mat::default();
        opencv::core::absdiff(&ab, &ba, &mut diff).unwrap();
        assert!(opencv::core::count_non_zero(&diff.reshape(1, 0).unwrap()).unwrap() > 0);
    }

    #[tokio::test]
    async fn test_empty_table_is_no_regions() {
        let (_root, ctx) = test_ctx();
        let video = ctx.temp_path().join("input.avi");
        // The check fires before any decode, so the file need not exist
        let err = apply_mosaic(&video, &RegionTable::new(), MosaicOptions::default(), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, VideoProcessingError::NoRegions));
        assert!(!ctx.output_path_for(&video).exists());
    }

    #[tokio::test]
    async fn test_apply_preserves_frame_count() {
        let (_root, ctx) = test_ctx();
        let video = ctx.temp_path().join("input.avi");
        if !sweeping_video(&video, 50, 25.0) {
            eprintln!("skipping: no video encoder backend available");
            return;
        }

        let table = RegionTable::from_regions(vec![
            region(1, BBox::new(10, 10, 40, 40)),
            region(40, BBox::new(60, 30, 40, 40)),
        ]);

        let output = match apply_mosaic(&video, &table, MosaicOptions::default(), &ctx).await {
            Ok(path) => path,
            Err(VideoProcessingError::EncodeFailure(e)) => {
                eprintln!("skipping: mp4v encoder unavailable ({e})");
                return;
            }
            Err(e) => panic!("unexpected error: {e}"),
        };

        assert!(output.exists());

        let cap = videoio::VideoCapture::from_file(output.to_str().unwrap(), videoio::CAP_ANY)
            .unwrap();
        let frames = cap.get(videoio::CAP_PROP_FRAME_COUNT).unwrap() as u64;
        let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap() as i32;
        let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap() as i32;
        let fps = cap.get(videoio::CAP_PROP_FPS).unwrap();

        assert_eq!(frames, 50);
        assert_eq!(width, crate::test_support::TEST_W);
        assert_eq!(height, crate::test_support::TEST_H);
        assert!((fps - 25.0).abs() < 0.5);
    }
}
