//! End-to-end redaction pipeline.

use std::path::{Path, PathBuf};
use tracing::info;

use vmask_models::{FrameSample, RegionTable};

use crate::context::RunContext;
use crate::detector::RegionDetector;
use crate::error::MediaResult;
use crate::mosaic::{apply_mosaic, MosaicOptions};
use crate::sampler::{extract_frames, SampleOptions};

/// Everything a finished run produced, kept around for validation.
#[derive(Debug)]
pub struct RedactionOutcome {
    /// Frames handed to the detector
    pub frames: Vec<FrameSample>,

    /// Region table the mosaic stage resolved against
    pub table: RegionTable,

    /// Finished video
    pub output_path: PathBuf,
}

/// Run the full pipeline: sample frames, ask the detector for regions,
/// build the region table, and rewrite the video with regions pixelated.
///
/// Each stage fails fast; there is no partial-success return. A detector
/// that finds nothing surfaces as `NoRegions` from the mosaic stage.
pub async fn run_redaction(
    video_path: &Path,
    target: &str,
    detector: &dyn RegionDetector,
    sample_options: &SampleOptions,
    mosaic_options: MosaicOptions,
    ctx: &RunContext,
) -> MediaResult<RedactionOutcome> {
    let frames = extract_frames(video_path, sample_options, ctx)?;
    info!(
        run_id = %ctx.run_id(),
        frames = frames.len(),
        detector = detector.name(),
        "Requesting detections"
    );

    let regions = detector.detect(video_path, &frames, target).await?;
    let table = RegionTable::from_regions(regions);
    info!(
        run_id = %ctx.run_id(),
        keyframes = table.keyframe_count(),
        regions = table.region_count(),
        "Region table built"
    );

    let output_path = apply_mosaic(video_path, &table, mosaic_options, ctx).await?;

    Ok(RedactionOutcome {
        frames,
        table,
        output_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessorConfig;
    use crate::error::VideoProcessingError;
    use async_trait::async_trait;
    use tempfile::TempDir;
    use vmask_models::{BBox, DetectionRegion};

    struct FixedDetector(Vec<DetectionRegion>);

    #[async_trait]
    impl RegionDetector for FixedDetector {
        async fn detect(
            &self,
            _video_path: &Path,
            _frames: &[FrameSample],
            _target: &str,
        ) -> MediaResult<Vec<DetectionRegion>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
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

    #[tokio::test]
    async fn test_detector_finding_nothing_is_no_regions() {
        let (_root, ctx) = test_ctx();
        let video = ctx.temp_path().join("input.avi");
        if !crate::test_support::sweeping_video(&video, 40, 25.0) {
            eprintln!("skipping: no video encoder backend available");
            return;
        }

        let detector = FixedDetector(Vec::new());
        let err = run_redaction(
            &video,
            "the phone",
            &detector,
            &SampleOptions::default(),
            MosaicOptions::default(),
            &ctx,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, VideoProcessingError::NoRegions));
    }

    #[tokio::test]
    async fn test_full_run_produces_output() {
        let (_root, ctx) = test_ctx();
        let video = ctx.temp_path().join("input.avi");
        if !crate::test_support::sweeping_video(&video, 40, 25.0) {
            eprintln!("skipping: no video encoder backend available");
            return;
        }

        let detector = FixedDetector(vec![DetectionRegion::new(
            1,
            "phone",
            BBox::new(10, 10, 40, 40),
            0.95,
            "seed annotation",
            None,
        )
        .unwrap()]);

        let outcome = match run_redaction(
            &video,
            "the phone",
            &detector,
            &SampleOptions::default(),
            MosaicOptions::default(),
            &ctx,
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(VideoProcessingError::EncodeFailure(e)) => {
                eprintln!("skipping: mp4v encoder unavailable ({e})");
                return;
            }
            Err(e) => panic!("unexpected error: {e}"),
        };

        assert!(!outcome.frames.is_empty());
        assert_eq!(outcome.table.keyframe_count(), 1);
        assert!(outcome.output_path.exists());
    }
}
