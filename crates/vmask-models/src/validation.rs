//! Validation results and the report format.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pipeline stage a validation check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    /// Frame sampling output
    FrameExtraction,
    /// Externally supplied detections
    LlmDetection,
    /// Video-space vs image-space coordinate consistency
    CoordinateConversion,
    /// Sparse-to-dense region resolution
    TrackingInterpolation,
    /// Pixelation of a sample frame
    MosaicApplication,
    /// Source vs output comparison
    EndToEndCoverage,
}

impl ValidationStage {
    /// All stages, in pipeline order.
    pub const ALL: &'static [ValidationStage] = &[
        ValidationStage::FrameExtraction,
        ValidationStage::LlmDetection,
        ValidationStage::CoordinateConversion,
        ValidationStage::TrackingInterpolation,
        ValidationStage::MosaicApplication,
        ValidationStage::EndToEndCoverage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStage::FrameExtraction => "frame_extraction",
            ValidationStage::LlmDetection => "llm_detection",
            ValidationStage::CoordinateConversion => "coordinate_conversion",
            ValidationStage::TrackingInterpolation => "tracking_interpolation",
            ValidationStage::MosaicApplication => "mosaic_application",
            ValidationStage::EndToEndCoverage => "end_to_end_coverage",
        }
    }
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ValidationStage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frame_extraction" => Ok(ValidationStage::FrameExtraction),
            "llm_detection" => Ok(ValidationStage::LlmDetection),
            "coordinate_conversion" => Ok(ValidationStage::CoordinateConversion),
            "tracking_interpolation" => Ok(ValidationStage::TrackingInterpolation),
            "mosaic_application" => Ok(ValidationStage::MosaicApplication),
            "end_to_end_coverage" => Ok(ValidationStage::EndToEndCoverage),
            _ => Err(StageParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown validation stage: {0}")]
pub struct StageParseError(String);

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pass,
    Fail,
    Warning,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pass => "pass",
            ValidationStatus::Fail => "fail",
            ValidationStatus::Warning => "warning",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, ValidationStatus::Pass)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One validation check's outcome. Append-only: results are never mutated
/// after the validator records them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub stage: ValidationStage,
    pub status: ValidationStatus,
    pub message: String,

    /// Structured payload backing the message (counts, rates, samples)
    #[serde(default)]
    pub details: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl ValidationResult {
    fn new(stage: ValidationStage, status: ValidationStatus, message: impl Into<String>) -> Self {
        Self {
            stage,
            status,
            message: message.into(),
            details: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    pub fn pass(stage: ValidationStage, message: impl Into<String>) -> Self {
        Self::new(stage, ValidationStatus::Pass, message)
    }

    pub fn fail(stage: ValidationStage, message: impl Into<String>) -> Self {
        Self::new(stage, ValidationStatus::Fail, message)
    }

    pub fn warning(stage: ValidationStage, message: impl Into<String>) -> Self {
        Self::new(stage, ValidationStatus::Warning, message)
    }

    /// Attach a structured details payload.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Aggregate counters for a validation run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,

    /// Percent-formatted pass rate, e.g. "83.3%"
    pub success_rate: String,

    pub generated_at: DateTime<Utc>,
}

impl ValidationSummary {
    /// Tally a result list.
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.status.is_pass()).count();
        let failed = results
            .iter()
            .filter(|r| r.status == ValidationStatus::Fail)
            .count();
        let warnings = results
            .iter()
            .filter(|r| r.status == ValidationStatus::Warning)
            .count();

        let success_rate = if total > 0 {
            format!("{:.1}%", passed as f64 / total as f64 * 100.0)
        } else {
            "0%".to_string()
        };

        Self {
            total,
            passed,
            failed,
            warnings,
            success_rate,
            generated_at: Utc::now(),
        }
    }
}

/// The full validation report written next to the output video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub summary: ValidationSummary,
    pub results: Vec<ValidationResult>,
    pub recommendations: Vec<String>,
}
