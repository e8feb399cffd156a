//! Annotation session operations.

use async_trait::async_trait;
use schemars::{schema::RootSchema, schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

use vmask_media::{extract_frames, RunContext, SampleOptions, VideoProcessingError};
use vmask_session::SessionRecord;

use crate::context::OpsContext;
use crate::error::OpsResult;
use crate::operation::{parse_params, Operation};
use crate::operations::persist_frames;

/// Parameters for `create_session`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionParams {
    /// Source video file
    pub video_path: PathBuf,

    /// What the annotator should mark ("the phone on the desk", ...)
    pub target_description: Option<String>,

    /// Display name; defaults to "{target}_annotation" or the video stem
    pub session_name: Option<String>,

    /// Extract one candidate every N frames (defaults from config)
    pub sample_rate: Option<u32>,

    /// Frames offered for annotation; one best frame by default
    pub max_frames: Option<u32>,
}

/// Extract frames and open an annotation session around them.
pub struct CreateSessionOp;

#[async_trait]
impl Operation for CreateSessionOp {
    fn name(&self) -> &'static str {
        "create_session"
    }

    fn description(&self) -> &'static str {
        "Extract frames and open an annotation session awaiting regions"
    }

    fn parameters_schema(&self) -> RootSchema {
        schema_for!(CreateSessionParams)
    }

    async fn execute(&self, ctx: &OpsContext, params: Value) -> OpsResult<Value> {
        let params: CreateSessionParams = parse_params(params)?;
        let config = ctx.config().clone();

        let options = SampleOptions {
            sample_rate: params.sample_rate.unwrap_or(config.default_sample_rate),
            // Single-frame annotation unless the caller asks for more
            max_frames: params.max_frames.unwrap_or(1),
            motion_aware: true,
        };

        let run = RunContext::create(config)?;
        let frames = extract_frames(&params.video_path, &options, &run)?;
        if frames.is_empty() {
            return Err(VideoProcessingError::source_unavailable(
                "No frames could be extracted for annotation",
            )
            .into());
        }

        let session_name = params.session_name.or_else(|| {
            params
                .target_description
                .as_ref()
                .map(|t| format!("{t}_annotation"))
        });

        let mut record = SessionRecord::new(&params.video_path, session_name, Vec::new());

        // Artifacts move into the session directory so they outlive the run
        let session_dir = ctx.store().root().join(&record.session_id);
        record.frames = persist_frames(&frames, &session_dir.join("frames")).await?;

        let record = record.open_for_annotation()?;
        ctx.store().save(&record).await?;

        info!(
            session_id = %record.session_id,
            frames = record.frames.len(),
            "Annotation session created"
        );

        Ok(json!({
            "session_id": record.session_id,
            "session_dir": session_dir,
            "frames_extracted": record.frames.len(),
            "status": record.status,
        }))
    }
}

/// Parameters naming a session.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SessionIdParams {
    pub session_id: String,
}

/// Fetch an annotated session's regions for mosaic processing.
pub struct LoadAnnotationOp;

#[async_trait]
impl Operation for LoadAnnotationOp {
    fn name(&self) -> &'static str {
        "load_annotation"
    }

    fn description(&self) -> &'static str {
        "Load the regions an annotated session produced"
    }

    fn parameters_schema(&self) -> RootSchema {
        schema_for!(SessionIdParams)
    }

    async fn execute(&self, ctx: &OpsContext, params: Value) -> OpsResult<Value> {
        let params: SessionIdParams = parse_params(params)?;
        let regions = ctx.store().load_regions(&params.session_id).await?;
        Ok(serde_json::to_value(regions)?)
    }
}

/// List all known annotation sessions.
pub struct ListSessionsOp;

#[async_trait]
impl Operation for ListSessionsOp {
    fn name(&self) -> &'static str {
        "list_sessions"
    }

    fn description(&self) -> &'static str {
        "List annotation sessions and their states"
    }

    fn parameters_schema(&self) -> RootSchema {
        schema_for!(super::info::NoParams)
    }

    async fn execute(&self, ctx: &OpsContext, params: Value) -> OpsResult<Value> {
        let _: super::info::NoParams = parse_params(params)?;
        let sessions = ctx.store().list().await?;
        Ok(json!({ "sessions": sessions }))
    }
}
