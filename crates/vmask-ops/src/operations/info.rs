//! Video inspection operations.

use async_trait::async_trait;
use schemars::{schema::RootSchema, schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;

use vmask_media::{
    probe_video, RECOMMENDED_FORMAT, SUPPORTED_INPUT_FORMATS, SUPPORTED_OUTPUT_FORMATS,
};

use crate::context::OpsContext;
use crate::error::OpsResult;
use crate::operation::{parse_params, Operation};

/// Parameters naming a single video file.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VideoPathParams {
    /// Video file to inspect
    pub video_path: PathBuf,
}

/// Probe a video's duration, resolution, frame rate and size.
pub struct VideoInfoOp;

#[async_trait]
impl Operation for VideoInfoOp {
    fn name(&self) -> &'static str {
        "video_info"
    }

    fn description(&self) -> &'static str {
        "Probe duration, resolution, frame rate, frame count and size"
    }

    fn parameters_schema(&self) -> RootSchema {
        schema_for!(VideoPathParams)
    }

    async fn execute(&self, _ctx: &OpsContext, params: Value) -> OpsResult<Value> {
        let params: VideoPathParams = parse_params(params)?;
        let info = probe_video(&params.video_path).await?;
        Ok(serde_json::to_value(info)?)
    }
}

/// Result of a video file check. Never an error: problems land in `error`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FileCheck {
    pub is_valid: bool,
    pub exists: bool,
    pub readable: bool,
    pub error: Option<String>,
}

/// Check that a path exists, is readable and probes as a video.
pub struct ValidateVideoOp;

#[async_trait]
impl Operation for ValidateVideoOp {
    fn name(&self) -> &'static str {
        "validate_video"
    }

    fn description(&self) -> &'static str {
        "Check that a file exists, is readable and is a decodable video"
    }

    fn parameters_schema(&self) -> RootSchema {
        schema_for!(VideoPathParams)
    }

    async fn execute(&self, _ctx: &OpsContext, params: Value) -> OpsResult<Value> {
        let params: VideoPathParams = parse_params(params)?;
        let path = &params.video_path;

        let mut check = FileCheck {
            is_valid: false,
            exists: false,
            readable: false,
            error: None,
        };

        if !path.exists() {
            check.error = Some("File does not exist".to_string());
            return Ok(serde_json::to_value(check)?);
        }
        check.exists = true;

        if let Err(e) = tokio::fs::File::open(path).await {
            check.error = Some(format!("File is not readable: {e}"));
            return Ok(serde_json::to_value(check)?);
        }
        check.readable = true;

        match probe_video(path).await {
            Ok(_) => check.is_valid = true,
            Err(e) => check.error = Some(format!("Invalid video format: {e}")),
        }

        Ok(serde_json::to_value(check)?)
    }
}

/// Parameterless operations take an empty object.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}

/// List the supported container formats.
pub struct SupportedFormatsOp;

#[async_trait]
impl Operation for SupportedFormatsOp {
    fn name(&self) -> &'static str {
        "supported_formats"
    }

    fn description(&self) -> &'static str {
        "List supported input and output container formats"
    }

    fn parameters_schema(&self) -> RootSchema {
        schema_for!(NoParams)
    }

    async fn execute(&self, _ctx: &OpsContext, params: Value) -> OpsResult<Value> {
        let _: NoParams = parse_params(params)?;

        Ok(json!({
            "input_formats": SUPPORTED_INPUT_FORMATS,
            "output_formats": SUPPORTED_OUTPUT_FORMATS,
            "recommended_format": RECOMMENDED_FORMAT,
            "notes": "MP4 format is recommended for best compatibility",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    async fn test_supported_formats() {
        let (_dir, ctx) = ctx();
        let result = SupportedFormatsOp.execute(&ctx, Value::Null).await.unwrap();

        assert_eq!(result["recommended_format"], ".mp4");
        assert!(result["input_formats"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f == ".mkv"));
    }

    #[tokio::test]
    async fn test_validate_missing_video() {
        let (_dir, ctx) = ctx();
        let result = ValidateVideoOp
            .execute(&ctx, json!({ "video_path": "/nope/missing.mp4" }))
            .await
            .unwrap();

        let check: FileCheck = serde_json::from_value(result).unwrap();
        assert!(!check.exists);
        assert!(!check.is_valid);
        assert_eq!(check.error.as_deref(), Some("File does not exist"));
    }

    #[tokio::test]
    async fn test_validate_non_video_file() {
        let (dir, ctx) = ctx();
        let path = dir.path().join("not_a_video.mp4");
        tokio::fs::write(&path, b"plain text").await.unwrap();

        let result = ValidateVideoOp
            .execute(&ctx, json!({ "video_path": path }))
            .await
            .unwrap();

        let check: FileCheck = serde_json::from_value(result).unwrap();
        assert!(check.exists);
        assert!(check.readable);
        assert!(!check.is_valid);
    }

    #[tokio::test]
    async fn test_unknown_parameter_rejected() {
        let (_dir, ctx) = ctx();
        let err = VideoInfoOp
            .execute(&ctx, json!({ "video_path": "/a.mp4", "surprise": 1 }))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::OpsError::InvalidParameters(_)));
    }
}
