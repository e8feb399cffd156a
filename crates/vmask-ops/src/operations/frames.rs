//! Frame extraction operation.

use async_trait::async_trait;
use schemars::{schema::RootSchema, schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use vmask_media::{extract_frames, RunContext, SampleOptions};

use crate::context::OpsContext;
use crate::error::OpsResult;
use crate::operation::{parse_params, Operation};
use crate::operations::persist_frames;

fn default_true() -> bool {
    true
}

/// Parameters for `extract_frames`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExtractFramesParams {
    /// Source video file
    pub video_path: PathBuf,

    /// Directory the frame images are persisted into
    pub output_dir: PathBuf,

    /// Extract one candidate every N frames (defaults from config)
    pub sample_rate: Option<u32>,

    /// Upper bound on extracted frames (defaults from config)
    pub max_frames: Option<u32>,

    /// Skip candidates that look like the last kept frame
    #[serde(default = "default_true")]
    pub motion_aware: bool,
}

/// Extract representative frames for downstream analysis.
pub struct ExtractFramesOp;

#[async_trait]
impl Operation for ExtractFramesOp {
    fn name(&self) -> &'static str {
        "extract_frames"
    }

    fn description(&self) -> &'static str {
        "Extract a bounded, motion-aware subset of frames as image files"
    }

    fn parameters_schema(&self) -> RootSchema {
        schema_for!(ExtractFramesParams)
    }

    async fn execute(&self, ctx: &OpsContext, params: Value) -> OpsResult<Value> {
        let params: ExtractFramesParams = parse_params(params)?;
        let config = ctx.config().clone();

        let options = SampleOptions {
            sample_rate: params.sample_rate.unwrap_or(config.default_sample_rate),
            max_frames: params.max_frames.unwrap_or(config.max_frames_per_request),
            motion_aware: params.motion_aware,
        };

        let run = RunContext::create(config)?;
        let frames = extract_frames(&params.video_path, &options, &run)?;
        let frames = persist_frames(&frames, &params.output_dir).await?;

        Ok(json!({ "frames": frames }))
    }
}
