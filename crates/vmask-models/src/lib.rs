//! Shared data models for the VideoMask redaction pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Sampled frames and their on-disk artifacts
//! - Detection regions and the `regions.json` interchange format
//! - The per-frame region table consumed by the mosaic stage
//! - Validation results and reports
//! - Probed video metadata

pub mod frame;
pub mod region;
pub mod table;
pub mod validation;
pub mod video;

// Re-export common types
pub use frame::FrameSample;
pub use region::{BBox, DetectionRegion, RegionError, RegionRecord, RegionSet};
pub use table::RegionTable;
pub use validation::{
    StageParseError, ValidationReport, ValidationResult, ValidationStage, ValidationStatus,
    ValidationSummary,
};
pub use video::VideoInfo;
