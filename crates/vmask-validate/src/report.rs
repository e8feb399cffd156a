//! Validation report assembly.

use std::path::Path;
use tracing::info;

use vmask_models::{ValidationReport, ValidationResult, ValidationStage, ValidationSummary};

use crate::validator::PipelineValidator;

impl PipelineValidator {
    /// Assemble the report for every check run so far.
    pub fn generate_report(&self) -> ValidationReport {
        let results = self.results().to_vec();
        let summary = ValidationSummary::from_results(&results);
        let recommendations = recommendations(&results);

        ValidationReport {
            summary,
            results,
            recommendations,
        }
    }
}

/// Write a report as pretty-printed JSON.
pub async fn write_report(report: &ValidationReport, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(report)?;
    tokio::fs::write(path, json).await?;

    info!(
        path = %path.display(),
        total = report.summary.total,
        failed = report.summary.failed,
        "Validation report written"
    );
    Ok(())
}

/// Remediation suggestions keyed by which stages failed.
fn recommendations(results: &[ValidationResult]) -> Vec<String> {
    let failed = |stage: ValidationStage| {
        results
            .iter()
            .any(|r| r.stage == stage && r.status == vmask_models::ValidationStatus::Fail)
    };

    let mut out = Vec::new();

    if failed(ValidationStage::FrameExtraction) {
        out.push(
            "Review frame extraction parameters; check that the sample rate and frame limit fit the video length"
                .to_string(),
        );
    }
    if failed(ValidationStage::LlmDetection) {
        out.push(
            "Refine the detector prompt or adjust the detection confidence threshold".to_string(),
        );
    }
    if failed(ValidationStage::CoordinateConversion) {
        out.push(
            "Check the coordinate conversion logic; verify the scale factors between video and frame space"
                .to_string(),
        );
    }
    if failed(ValidationStage::TrackingInterpolation) {
        out.push("Increase keyframe density or revisit the interpolation policy".to_string());
    }
    if failed(ValidationStage::MosaicApplication) {
        out.push(
            "Check the mosaic implementation; verify region coordinates and strength".to_string(),
        );
    }
    if failed(ValidationStage::EndToEndCoverage) {
        out.push(
            "Run a complete end-to-end pass and check consistency across the stages".to_string(),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vmask_models::{BBox, DetectionRegion, FrameSample, RegionTable};

    fn frame(frame_id: u32) -> FrameSample {
        FrameSample {
            frame_id,
            timestamp: frame_id as f64,
            image_path: std::path::PathBuf::from("/tmp/none.jpg"),
            width: 1920,
            height: 1080,
        }
    }

    #[test]
    fn test_report_counts_and_recommendations() {
        let frames: Vec<FrameSample> = (1..=10).map(frame).collect();
        let detections: Vec<DetectionRegion> = (1..=10)
            .map(|id| {
                DetectionRegion::new(id, "phone", BBox::new(0, 0, 200, 200), 0.95, "", None)
                    .unwrap()
            })
            .collect();

        let mut validator = PipelineValidator::new();
        validator.validate_detections(&frames, &detections, None); // pass
        validator.validate_tracking_interpolation(&RegionTable::new(), &[1, 2, 3], 100); // fail

        let report = validator.generate_report();
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.passed, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.success_rate, "50.0%");

        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("keyframe density"));
    }

    #[test]
    fn test_all_pass_has_no_recommendations() {
        let frames: Vec<FrameSample> = (1..=4).map(frame).collect();
        let detections: Vec<DetectionRegion> = (1..=4)
            .map(|id| {
                DetectionRegion::new(id, "phone", BBox::new(0, 0, 200, 200), 0.95, "", None)
                    .unwrap()
            })
            .collect();

        let mut validator = PipelineValidator::new();
        validator.validate_detections(&frames, &detections, None);

        let report = validator.generate_report();
        assert!(report.recommendations.is_empty());
        assert_eq!(report.summary.success_rate, "100.0%");
    }

    #[tokio::test]
    async fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("validation").join("report.json");

        let mut validator = PipelineValidator::new();
        validator.validate_tracking_interpolation(&RegionTable::new(), &[1], 10);

        let report = validator.generate_report();
        write_report(&report, &path).await.unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["summary"]["total"], 1);
        assert!(parsed["results"][0]["stage"] == "tracking_interpolation");
        assert!(parsed["recommendations"].is_array());
    }
}
