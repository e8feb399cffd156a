//! The pipeline validator and its six stage checks.
//!
//! Thresholds here are domain tolerances tuned against real runs; they are
//! contractual, not approximations to improve on.

use opencv::{core, imgcodecs, prelude::*, videoio};
use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

use vmask_media::{mosaic_frame_regions, probe_video, RegionInterpolator};
use vmask_models::{
    DetectionRegion, FrameSample, RegionTable, ValidationResult, ValidationStage, VideoInfo,
};

/// Most detections tolerated per sampled frame.
const MAX_DETECTIONS_PER_FRAME: usize = 3;

/// Fraction of sampled frames that must carry at least one detection.
const MIN_DETECTION_COVERAGE: f64 = 0.5;

/// Floor for the mean detection confidence.
const MIN_AVG_CONFIDENCE: f64 = 0.70;

/// A detection below this confidence counts as low-confidence.
const LOW_CONFIDENCE: f64 = 0.5;

/// Tolerated share of low-confidence detections.
const MAX_LOW_CONFIDENCE_SHARE: f64 = 0.3;

/// A region covering more than this share of the frame is suspect.
const MAX_REGION_AREA_SHARE: f64 = 0.25;

/// A region under this share of the frame area counts as tiny.
const TINY_REGION_AREA_SHARE: f64 = 0.001;

/// Tolerated share of tiny regions.
const MAX_TINY_REGION_SHARE: f64 = 0.2;

/// Largest tolerated difference between the X and Y scale factors.
const MAX_SCALE_SKEW: f64 = 0.1;

/// Detections round-tripped during coordinate verification.
const COORD_SAMPLE: usize = 5;

/// Fewer keyframes than this cannot interpolate meaningfully.
const MIN_KEYFRAMES: usize = 2;

/// Largest keyframe gap, as a share of total video length.
const MAX_KEYFRAME_GAP_SHARE: f64 = 0.3;

/// Fraction of test frames that must resolve to a non-empty region list.
const MIN_INTERPOLATION_COVERAGE: f64 = 0.9;

/// Longest tolerated contiguous run of uncovered test frames.
const MAX_COVERAGE_GAP_RUN: usize = 5;

/// Mean absolute pixel difference below which a change is invisible.
const VISIBILITY_THRESHOLD: f64 = 1.0;

/// Tolerated deviation of an id gap from the mean gap.
const GAP_DEVIATION_SHARE: f64 = 0.5;

/// Frames compared during the end-to-end check.
const E2E_SAMPLE_FRAMES: u64 = 20;

/// Change rate below this suggests the mosaic was under-applied.
const MIN_CHANGE_RATE: f64 = 0.1;

/// Change rate above this suggests over-application (false positives).
const MAX_CHANGE_RATE: f64 = 0.8;

/// Accumulates one [`ValidationResult`] per executed check.
///
/// Results are append-only; every check records exactly one result and
/// returns a copy of it.
#[derive(Debug, Default)]
pub struct PipelineValidator {
    results: Vec<ValidationResult>,
}

impl PipelineValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results recorded so far, in execution order.
    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    fn record(&mut self, result: ValidationResult) -> ValidationResult {
        if !result.status.is_pass() {
            warn!(stage = %result.stage, status = %result.status, message = %result.message,
                "Validation check did not pass");
        } else {
            debug!(stage = %result.stage, "Validation check passed");
        }
        self.results.push(result.clone());
        result
    }

    /// Check the sampler's output against the source video.
    pub async fn validate_frame_extraction(
        &mut self,
        video_path: &Path,
        frames: &[FrameSample],
        expected_count: Option<usize>,
    ) -> ValidationResult {
        let stage = ValidationStage::FrameExtraction;

        let info = match probe_video(video_path).await {
            Ok(info) => info,
            Err(e) => {
                return self.record(ValidationResult::fail(
                    stage,
                    format!("Cannot probe source video: {e}"),
                ));
            }
        };

        if frames.is_empty() {
            return self.record(ValidationResult::fail(stage, "No frames were extracted"));
        }

        let mut issues: Vec<String> = Vec::new();

        if let Some(expected) = expected_count {
            if frames.len() != expected {
                issues.push(format!(
                    "Frame count mismatch: expected {expected}, got {}",
                    frames.len()
                ));
            }
        }

        let ids: Vec<u32> = frames.iter().map(|f| f.frame_id).collect();
        let min_id = *ids.iter().min().unwrap();
        let max_id = *ids.iter().max().unwrap();
        if min_id < 1 || max_id as u64 > info.frame_count {
            issues.push(format!(
                "Frame ids out of range: {min_id}-{max_id}, video has {} frames",
                info.frame_count
            ));
        }

        let timestamps: Vec<f64> = frames.iter().map(|f| f.timestamp).collect();
        if timestamps
            .iter()
            .any(|t| *t < 0.0 || *t > info.duration)
        {
            issues.push(format!("Timestamps out of range: 0-{:.2}s", info.duration));
        }

        let missing = frames
            .iter()
            .filter(|f| !f.image_path.exists())
            .count();
        if missing > 0 {
            issues.push(format!("Missing frame artifacts: {missing}"));
        }

        if ids.len() > 1 {
            let gaps: Vec<f64> = ids.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
            let mean_gap = gaps.iter().sum::<f64>() / gaps.len() as f64;
            let max_deviation = gaps
                .iter()
                .map(|g| (g - mean_gap).abs())
                .fold(0.0, f64::max);
            if max_deviation > mean_gap * GAP_DEVIATION_SHARE {
                issues.push(format!(
                    "Uneven frame distribution: mean gap {mean_gap:.1}, max deviation {max_deviation:.1}"
                ));
            }
        }

        let details = json!({
            "video_info": {
                "total_frames": info.frame_count,
                "fps": info.fps,
                "duration": info.duration,
            },
            "extraction_info": {
                "extracted_count": frames.len(),
                "frame_id_range": format!("{min_id}-{max_id}"),
                "timestamp_range": format!(
                    "{:.2}-{:.2}s",
                    timestamps.iter().cloned().fold(f64::INFINITY, f64::min),
                    timestamps.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                ),
            },
            "issues": issues,
        });

        self.record(finish(stage, issues, "Frame extraction validated", details))
    }

    /// Sanity-check the externally supplied detections.
    pub fn validate_detections(
        &mut self,
        frames: &[FrameSample],
        detections: &[DetectionRegion],
        video_info: Option<&VideoInfo>,
    ) -> ValidationResult {
        let stage = ValidationStage::LlmDetection;
        let mut issues: Vec<String> = Vec::new();

        let frame_count = frames.len();
        let detection_count = detections.len();

        if detection_count == 0 {
            issues.push("No detections returned".to_string());
        } else if detection_count > frame_count * MAX_DETECTIONS_PER_FRAME {
            issues.push(format!(
                "Too many detections: {detection_count} across {frame_count} frames"
            ));
        }

        let detected_frames: BTreeSet<u32> = detections.iter().map(|d| d.frame_id).collect();
        let frame_ids: BTreeSet<u32> = frames.iter().map(|f| f.frame_id).collect();
        let coverage_rate = if frame_ids.is_empty() {
            0.0
        } else {
            detected_frames.len() as f64 / frame_ids.len() as f64
        };
        if coverage_rate < MIN_DETECTION_COVERAGE {
            issues.push(format!(
                "Detection coverage too low: {:.1}%",
                coverage_rate * 100.0
            ));
        }

        if let Some(info) = video_info {
            let out_of_bounds = detections
                .iter()
                .filter(|d| !d.bbox.fits_within(info.width, info.height))
                .count();
            if out_of_bounds > 0 {
                issues.push(format!(
                    "Bboxes outside video bounds ({}): {out_of_bounds}",
                    info.resolution()
                ));
            }
        }

        let confidences: Vec<f64> = detections.iter().map(|d| d.confidence).collect();
        if !confidences.is_empty() {
            let avg = confidences.iter().sum::<f64>() / confidences.len() as f64;
            let low = confidences.iter().filter(|c| **c < LOW_CONFIDENCE).count();

            if avg < MIN_AVG_CONFIDENCE {
                issues.push(format!("Mean confidence too low: {avg:.2}"));
            }
            if low as f64 > confidences.len() as f64 * MAX_LOW_CONFIDENCE_SHARE {
                issues.push(format!(
                    "Too many low-confidence detections: {low}/{}",
                    confidences.len()
                ));
            }
        }

        if let Some(info) = video_info {
            let frame_area = info.frame_area() as f64;
            let mut large = 0usize;
            let mut tiny = 0usize;
            for det in detections {
                let share = det.bbox.area() as f64 / frame_area;
                if share > MAX_REGION_AREA_SHARE {
                    large += 1;
                } else if share < TINY_REGION_AREA_SHARE {
                    tiny += 1;
                }
            }
            if large > 0 {
                issues.push(format!("Oversized regions: {large}"));
            }
            if tiny as f64 > detection_count as f64 * MAX_TINY_REGION_SHARE {
                issues.push(format!("Undersized regions: {tiny}"));
            }
        }

        let avg_confidence = if confidences.is_empty() {
            serde_json::Value::Null
        } else {
            json!(format!(
                "{:.2}",
                confidences.iter().sum::<f64>() / confidences.len() as f64
            ))
        };
        let details = json!({
            "detection_stats": {
                "total_detections": detection_count,
                "frames_with_detection": detected_frames.len(),
                "coverage_rate": format!("{:.1}%", coverage_rate * 100.0),
                "avg_confidence": avg_confidence,
            },
            "issues": issues,
        });

        self.record(finish(stage, issues, "Detection output validated", details))
    }

    /// Verify video-space coordinates agree with the sampled image space.
    pub fn validate_coordinate_conversion(
        &mut self,
        detections: &[DetectionRegion],
        video_info: &VideoInfo,
        frames: &[FrameSample],
    ) -> ValidationResult {
        let stage = ValidationStage::CoordinateConversion;

        if detections.is_empty() {
            return self.record(
                ValidationResult::warning(stage, "No detections to verify")
                    .with_details(json!({ "sampled": 0 })),
            );
        }

        let sample_frame = match frames.first() {
            Some(frame) => frame,
            None => {
                return self.record(ValidationResult::fail(
                    stage,
                    "No sample frame available for coordinate verification",
                ));
            }
        };

        let img = match read_image(&sample_frame.image_path) {
            Some(img) => img,
            None => {
                return self.record(ValidationResult::fail(
                    stage,
                    format!(
                        "Cannot read sample frame: {}",
                        sample_frame.image_path.display()
                    ),
                ));
            }
        };

        let img_width = img.cols() as f64;
        let img_height = img.rows() as f64;
        let scale_x = video_info.width as f64 / img_width;
        let scale_y = video_info.height as f64 / img_height;

        let mut issues: Vec<String> = Vec::new();

        if (scale_x - scale_y).abs() > MAX_SCALE_SKEW {
            issues.push(format!(
                "Inconsistent scale factors: X={scale_x:.2}, Y={scale_y:.2}"
            ));
        }

        // Round-trip a sample of detections back into image space
        let mut conversion_errors: Vec<u32> = Vec::new();
        for det in detections.iter().take(COORD_SAMPLE) {
            let img_x = det.bbox.x as f64 / scale_x;
            let img_y = det.bbox.y as f64 / scale_y;
            let img_w = det.bbox.width as f64 / scale_x;
            let img_h = det.bbox.height as f64 / scale_y;

            if img_x < 0.0 || img_y < 0.0 || img_x + img_w > img_width || img_y + img_h > img_height
            {
                conversion_errors.push(det.frame_id);
            }
        }
        if !conversion_errors.is_empty() {
            issues.push(format!(
                "Coordinate conversion errors: {} detections",
                conversion_errors.len()
            ));
        }

        let details = json!({
            "video_resolution": video_info.resolution(),
            "frame_resolution": format!("{}x{}", img_width as u32, img_height as u32),
            "scale_factors": format!("X={scale_x:.2}, Y={scale_y:.2}"),
            "sample_conversions": detections
                .iter()
                .take(3)
                .map(|det| json!({
                    "frame_id": det.frame_id,
                    "video_coords": det.bbox.to_array(),
                    "image_coords": [
                        (det.bbox.x as f64 / scale_x) as i64,
                        (det.bbox.y as f64 / scale_y) as i64,
                        (det.bbox.width as f64 / scale_x) as i64,
                        (det.bbox.height as f64 / scale_y) as i64,
                    ],
                }))
                .collect::<Vec<_>>(),
            "issues": issues,
        });

        self.record(finish(stage, issues, "Coordinate conversion validated", details))
    }

    /// Probe the interpolation policy over a representative frame set.
    pub fn validate_tracking_interpolation(
        &mut self,
        table: &RegionTable,
        test_frame_ids: &[u32],
        total_video_frames: u64,
    ) -> ValidationResult {
        let stage = ValidationStage::TrackingInterpolation;

        if test_frame_ids.is_empty() {
            return self.record(
                ValidationResult::warning(stage, "No test frames supplied")
                    .with_details(json!({ "test_frames": 0 })),
            );
        }

        let mut issues: Vec<String> = Vec::new();
        let keyframes = table.keyframe_ids();

        if keyframes.len() < MIN_KEYFRAMES {
            issues.push(format!(
                "Too few keyframes for meaningful interpolation: {}",
                keyframes.len()
            ));
        } else {
            let max_gap = keyframes
                .windows(2)
                .map(|w| (w[1] - w[0]) as u64)
                .max()
                .unwrap_or(0);
            if max_gap as f64 > total_video_frames as f64 * MAX_KEYFRAME_GAP_SHARE {
                issues.push(format!("Keyframe gap too large: {max_gap} frames"));
            }
        }

        let interpolator = RegionInterpolator::new(table);
        let mut gaps: Vec<u32> = Vec::new();
        let mut sample_results: Vec<serde_json::Value> = Vec::new();

        for &frame_id in test_frame_ids {
            let resolved = interpolator.resolve(frame_id);
            if resolved.is_empty() {
                gaps.push(frame_id);
            }
            if sample_results.len() < 10 {
                sample_results.push(json!({
                    "frame_id": frame_id,
                    "result_count": resolved.len(),
                    "has_result": !resolved.is_empty(),
                }));
            }
        }

        let covered = test_frame_ids.len() - gaps.len();
        let coverage_rate = covered as f64 / test_frame_ids.len() as f64;
        if coverage_rate < MIN_INTERPOLATION_COVERAGE {
            issues.push(format!(
                "Interpolation coverage too low: {:.1}%",
                coverage_rate * 100.0
            ));
        }

        // Contiguous runs of uncovered frames are worse than scattered ones
        let long_runs = contiguous_runs(&gaps)
            .into_iter()
            .filter(|run| *run > MAX_COVERAGE_GAP_RUN)
            .count();
        if long_runs > 0 {
            issues.push(format!("Large coverage gaps: {long_runs}"));
        }

        let details = json!({
            "keyframe_stats": {
                "total_keyframes": keyframes.len(),
                "keyframe_range": if keyframes.is_empty() {
                    serde_json::Value::Null
                } else {
                    json!(format!("{}-{}", keyframes[0], keyframes[keyframes.len() - 1]))
                },
            },
            "interpolation_stats": {
                "test_frames": test_frame_ids.len(),
                "coverage_rate": format!("{:.1}%", coverage_rate * 100.0),
                "coverage_gaps": gaps.len(),
            },
            "sample_results": sample_results,
            "issues": issues,
        });

        self.record(finish(stage, issues, "Tracking interpolation validated", details))
    }

    /// Re-apply the mosaic to one sample frame and check it visibly changed.
    pub fn validate_mosaic_application(
        &mut self,
        sample_frame_path: &Path,
        regions: &[DetectionRegion],
        strength: u32,
    ) -> ValidationResult {
        let stage = ValidationStage::MosaicApplication;

        let original = match read_image(sample_frame_path) {
            Some(img) => img,
            None => {
                return self.record(ValidationResult::fail(
                    stage,
                    format!("Cannot read sample frame: {}", sample_frame_path.display()),
                ));
            }
        };

        let frame_width = original.cols() as u32;
        let frame_height = original.rows() as u32;

        let mut issues: Vec<String> = Vec::new();

        let (valid, invalid): (Vec<&DetectionRegion>, Vec<&DetectionRegion>) = regions
            .iter()
            .partition(|r| r.bbox.fits_within(frame_width, frame_height));
        if !invalid.is_empty() {
            issues.push(format!("Invalid region coordinates: {}", invalid.len()));
        }
        if valid.is_empty() {
            return self.record(
                ValidationResult::fail(stage, "No valid mosaic regions")
                    .with_details(json!({
                        "regions_info": {
                            "total_regions": regions.len(),
                            "valid_regions": 0,
                            "invalid_regions": invalid.len(),
                        },
                    })),
            );
        }

        let mut applied = false;
        match original.try_clone() {
            Ok(mut processed) => {
                let owned: Vec<DetectionRegion> = valid.iter().map(|r| (*r).clone()).collect();
                match mosaic_frame_regions(&mut processed, &owned, strength) {
                    Ok(()) => {
                        for region in &owned {
                            let bbox = region.bbox.clamp_to(frame_width, frame_height);
                            let rect =
                                core::Rect::new(bbox.x, bbox.y, bbox.width, bbox.height);
                            let diff = match roi_mean_abs_diff(&original, &processed, rect) {
                                Ok(diff) => diff,
                                Err(e) => {
                                    issues.push(format!("ROI comparison failed: {e}"));
                                    continue;
                                }
                            };
                            if diff > VISIBILITY_THRESHOLD {
                                applied = true;
                                break;
                            }
                        }
                        if !applied {
                            issues.push("Mosaic produced no visible change".to_string());
                        }
                    }
                    Err(e) => issues.push(format!("Mosaic application failed: {e}")),
                }
            }
            Err(e) => issues.push(format!("Cannot copy sample frame: {e}")),
        }

        let details = json!({
            "frame_info": {
                "path": sample_frame_path.display().to_string(),
                "resolution": format!("{frame_width}x{frame_height}"),
            },
            "regions_info": {
                "total_regions": regions.len(),
                "valid_regions": valid.len(),
                "invalid_regions": invalid.len(),
            },
            "mosaic_settings": {
                "strength": strength,
                "applied": applied,
            },
            "issues": issues,
        });

        self.record(finish(stage, issues, "Mosaic application validated", details))
    }

    /// Compare source and output on a sampled frame subset.
    ///
    /// When `sample_frames` is `None`, an evenly-spaced subset of up to 20
    /// frame indices is used, so repeated runs compare the same frames.
    pub async fn validate_end_to_end_coverage(
        &mut self,
        video_path: &Path,
        output_path: &Path,
        sample_frames: Option<&[u64]>,
    ) -> ValidationResult {
        let stage = ValidationStage::EndToEndCoverage;

        let mut original = match open_capture(video_path) {
            Some(cap) => cap,
            None => {
                return self.record(ValidationResult::fail(
                    stage,
                    format!("Cannot open source video: {}", video_path.display()),
                ));
            }
        };
        let mut processed = match open_capture(output_path) {
            Some(cap) => cap,
            None => {
                return self.record(ValidationResult::fail(
                    stage,
                    format!("Cannot open processed video: {}", output_path.display()),
                ));
            }
        };

        let mut issues: Vec<String> = Vec::new();

        let total_frames = original
            .get(videoio::CAP_PROP_FRAME_COUNT)
            .unwrap_or(0.0) as u64;
        let processed_frames = processed
            .get(videoio::CAP_PROP_FRAME_COUNT)
            .unwrap_or(0.0) as u64;
        if total_frames != processed_frames {
            issues.push(format!(
                "Frame count mismatch: source {total_frames}, processed {processed_frames}"
            ));
        }

        let indices: Vec<u64> = match sample_frames {
            Some(indices) => indices.to_vec(),
            None => evenly_spaced(total_frames, E2E_SAMPLE_FRAMES),
        };

        let mut frames_with_changes = 0usize;
        let mut comparisons: Vec<serde_json::Value> = Vec::new();

        for &idx in &indices {
            let seek_ok = original
                .set(videoio::CAP_PROP_POS_FRAMES, idx as f64)
                .unwrap_or(false)
                && processed
                    .set(videoio::CAP_PROP_POS_FRAMES, idx as f64)
                    .unwrap_or(false);
            if !seek_ok {
                continue;
            }

            let mut orig_frame = Mat::default();
            let mut proc_frame = Mat::default();
            let read_ok = original.read(&mut orig_frame).unwrap_or(false)
                && processed.read(&mut proc_frame).unwrap_or(false);
            if !read_ok || orig_frame.empty() || proc_frame.empty() {
                continue;
            }

            let diff_score = match mean_abs_diff(&orig_frame, &proc_frame) {
                Ok(score) => score,
                Err(e) => {
                    debug!(frame = idx, error = %e, "Frame comparison failed");
                    continue;
                }
            };

            let has_changes = diff_score > VISIBILITY_THRESHOLD;
            if has_changes {
                frames_with_changes += 1;
            }
            if comparisons.len() < 10 {
                comparisons.push(json!({
                    "frame_id": idx + 1,
                    "diff_score": diff_score,
                    "has_changes": has_changes,
                }));
            }
        }

        let sampled = indices.len();
        let change_rate = if sampled > 0 {
            frames_with_changes as f64 / sampled as f64
        } else {
            0.0
        };

        if change_rate < MIN_CHANGE_RATE {
            issues.push(format!(
                "Mosaic coverage too low: only {:.1}% of sampled frames changed",
                change_rate * 100.0
            ));
        } else if change_rate > MAX_CHANGE_RATE {
            issues.push(format!(
                "Mosaic coverage too high: {:.1}% of sampled frames changed, possible false positives",
                change_rate * 100.0
            ));
        }

        let details = json!({
            "video_comparison": {
                "original_frames": total_frames,
                "processed_frames": processed_frames,
                "sampled_frames": sampled,
            },
            "coverage_analysis": {
                "frames_with_changes": frames_with_changes,
                "frames_without_changes": sampled - frames_with_changes,
                "change_rate": format!("{:.1}%", change_rate * 100.0),
            },
            "sample_results": comparisons,
            "issues": issues,
        });

        self.record(finish(stage, issues, "End-to-end coverage validated", details))
    }
}

/// Collapse a check's issues into a pass/fail result.
fn finish(
    stage: ValidationStage,
    issues: Vec<String>,
    pass_message: &str,
    details: serde_json::Value,
) -> ValidationResult {
    if issues.is_empty() {
        ValidationResult::pass(stage, pass_message).with_details(details)
    } else {
        ValidationResult::fail(stage, issues.join("; ")).with_details(details)
    }
}

/// Lengths of contiguous runs in a sorted id list.
fn contiguous_runs(ids: &[u32]) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut current = 0usize;

    for (i, id) in ids.iter().enumerate() {
        if i > 0 && *id == ids[i - 1] + 1 {
            current += 1;
        } else {
            if current > 0 {
                runs.push(current);
            }
            current = 1;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

/// Evenly-spaced sample of `count` indices over `[0, total)`.
fn evenly_spaced(total: u64, count: u64) -> Vec<u64> {
    if total == 0 {
        return Vec::new();
    }
    let count = count.min(total);
    let set: BTreeSet<u64> = (0..count).map(|k| k * total / count).collect();
    set.into_iter().collect()
}

fn read_image(path: &Path) -> Option<Mat> {
    let img = imgcodecs::imread(path.to_str()?, imgcodecs::IMREAD_COLOR).ok()?;
    if img.empty() {
        None
    } else {
        Some(img)
    }
}

fn open_capture(path: &Path) -> Option<videoio::VideoCapture> {
    let cap = videoio::VideoCapture::from_file(path.to_str()?, videoio::CAP_ANY).ok()?;
    if cap.is_opened().ok()? {
        Some(cap)
    } else {
        None
    }
}

/// Mean absolute pixel difference across all channels.
fn mean_abs_diff(a: &Mat, b: &Mat) -> opencv::Result<f64> {
    let mut diff = Mat::default();
    core::absdiff(a, b, &mut diff)?;
    let mean = core::mean(&diff, &core::no_array())?;
    let channels = diff.channels().max(1);
    Ok((0..channels).map(|c| mean[c as usize]).sum::<f64>() / channels as f64)
}

/// Mean absolute difference restricted to one rectangle.
fn roi_mean_abs_diff(a: &Mat, b: &Mat, rect: core::Rect) -> opencv::Result<f64> {
    let roi_a = Mat::roi(a, rect)?;
    let roi_b = Mat::roi(b, rect)?;
    mean_abs_diff(&roi_a, &roi_b)
}
