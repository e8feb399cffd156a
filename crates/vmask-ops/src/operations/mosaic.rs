//! Mosaic application operation.

use async_trait::async_trait;
use schemars::{schema::RootSchema, schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use vmask_media::{apply_mosaic, MosaicOptions, RunContext, VideoProcessingError};
use vmask_models::{RegionSet, RegionTable};

use crate::context::OpsContext;
use crate::error::OpsResult;
use crate::operation::{parse_params, Operation};

/// Parameters for `apply_mosaic`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ApplyMosaicParams {
    /// Source video file
    pub video_path: PathBuf,

    /// Regions to pixelate, in the `regions.json` interchange format
    pub regions: RegionSet,

    /// Pixelation coarseness (5-50, defaults from config)
    pub strength: Option<u32>,
}

/// Pixelate the given regions across the whole video.
pub struct ApplyMosaicOp;

#[async_trait]
impl Operation for ApplyMosaicOp {
    fn name(&self) -> &'static str {
        "apply_mosaic"
    }

    fn description(&self) -> &'static str {
        "Rewrite a video with the supplied regions pixelated"
    }

    fn parameters_schema(&self) -> RootSchema {
        schema_for!(ApplyMosaicParams)
    }

    async fn execute(&self, ctx: &OpsContext, params: Value) -> OpsResult<Value> {
        let params: ApplyMosaicParams = parse_params(params)?;

        if params.regions.is_empty() {
            return Err(VideoProcessingError::NoRegions.into());
        }

        let regions = params
            .regions
            .into_regions()
            .map_err(VideoProcessingError::from)?;
        let table = RegionTable::from_regions(regions);

        let config = ctx.config().clone();
        let strength = params.strength.unwrap_or(config.default_mosaic_strength);
        let run = RunContext::create(config)?;

        let output = apply_mosaic(
            &params.video_path,
            &table,
            MosaicOptions::new(strength),
            &run,
        )
        .await?;

        Ok(json!({ "output_path": output }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpsError;
    use tempfile::TempDir;
    use vmask_media::ProcessorConfig;

    fn ctx() -> (TempDir, OpsContext) {
        let dir = TempDir::new().unwrap();
        let config = ProcessorConfig {
            output_dir: dir.path().join("out"),
            temp_dir: dir.path().join("tmp"),
            ..ProcessorConfig::default()
        };
        (dir, OpsContext::new(config))
    }

    #[tokio::test]
    async fn test_empty_regions_rejected_before_decode() {
        let (_dir, ctx) = ctx();
        let params = json!({
            "video_path": "/videos/a.mp4",
            "regions": { "regions": [] },
        });

        let err = ApplyMosaicOp.execute(&ctx, params).await.unwrap_err();
        assert!(matches!(
            err,
            OpsError::Media(VideoProcessingError::NoRegions)
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_region_rejected() {
        let (_dir, ctx) = ctx();
        let params = json!({
            "video_path": "/videos/a.mp4",
            "regions": { "regions": [
                { "frame_id": 1, "bbox": [0, 0, 0, 10] }
            ]},
        });

        let err = ApplyMosaicOp.execute(&ctx, params).await.unwrap_err();
        assert!(matches!(
            err,
            OpsError::Media(VideoProcessingError::InvalidRegionData(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_bbox_is_invalid_parameters() {
        let (_dir, ctx) = ctx();
        let params = json!({
            "video_path": "/videos/a.mp4",
            "regions": { "regions": [ { "frame_id": 1 } ] },
        });

        let err = ApplyMosaicOp.execute(&ctx, params).await.unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameters(_)));
    }
}
