//! Detection regions and the `regions.json` interchange format.
//!
//! Region data arrives from outside the core (a vision model or a manual
//! annotator) and is untrusted: raw records are deserialized as
//! [`RegionRecord`] and only become [`DetectionRegion`] through validating
//! conversion. Missing `frame_id` or `bbox` fields are hard parse errors,
//! never coerced.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when constructing a region from untrusted input.
#[derive(Debug, Error, PartialEq)]
pub enum RegionError {
    #[error("frame_id must be >= 1")]
    ZeroFrameId,

    #[error("bbox has non-positive dimensions: {width}x{height}")]
    EmptyBox { width: i32, height: i32 },

    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// Bounding box in source-video pixel coordinates.
///
/// `x`/`y` may be negative on input (annotators can drag past the frame
/// edge); [`BBox::clamp_to`] brings a box fully inside a frame before any
/// pixel work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BBox {
    /// Left edge x-coordinate
    pub x: i32,
    /// Top edge y-coordinate
    pub y: i32,
    /// Box width
    pub width: i32,
    /// Box height
    pub height: i32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge x-coordinate.
    #[inline]
    pub fn x2(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate.
    #[inline]
    pub fn y2(&self) -> i32 {
        self.y + self.height
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// True when both dimensions are positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// True when the box lies fully inside a `frame_width` x `frame_height`
    /// frame.
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.is_positive()
            && self.x2() <= frame_width as i32
            && self.y2() <= frame_height as i32
    }

    /// Clamp the box into a `frame_width` x `frame_height` frame.
    ///
    /// The result always satisfies `0 <= x`, `0 <= y`, `x + w <= frame_width`
    /// and `y + h <= frame_height`, with `w >= 1` and `h >= 1`.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> BBox {
        let fw = frame_width as i32;
        let fh = frame_height as i32;

        let x = self.x.clamp(0, (fw - 1).max(0));
        let y = self.y.clamp(0, (fh - 1).max(0));
        let width = self.width.clamp(1, (fw - x).max(1));
        let height = self.height.clamp(1, (fh - y).max(1));

        BBox { x, y, width, height }
    }

    /// Convert to the `[x, y, w, h]` wire representation.
    pub fn to_array(&self) -> [i32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

impl From<[i32; 4]> for BBox {
    fn from(a: [i32; 4]) -> Self {
        BBox::new(a[0], a[1], a[2], a[3])
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.x, self.y, self.width, self.height)
    }
}

/// A validated detection region for one frame.
///
/// Construct through [`DetectionRegion::new`] or by converting a
/// [`RegionRecord`]; both reject zero frame ids, empty boxes and
/// out-of-range confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRegion {
    /// Frame the region belongs to (1-based)
    pub frame_id: u32,
    /// Kind of object covered ("phone", "face", ...)
    pub object_type: String,
    /// Bounding box in source-video pixel space
    pub bbox: BBox,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
    /// Free-text description from the detector or annotator
    pub description: String,
    /// Optional identity across frames
    pub track_id: Option<u32>,
}

impl DetectionRegion {
    /// Create a validated region.
    pub fn new(
        frame_id: u32,
        object_type: impl Into<String>,
        bbox: BBox,
        confidence: f64,
        description: impl Into<String>,
        track_id: Option<u32>,
    ) -> Result<Self, RegionError> {
        if frame_id == 0 {
            return Err(RegionError::ZeroFrameId);
        }
        if !bbox.is_positive() {
            return Err(RegionError::EmptyBox {
                width: bbox.width,
                height: bbox.height,
            });
        }
        if !(0.0..=1.0).contains(&confidence) || confidence.is_nan() {
            return Err(RegionError::ConfidenceOutOfRange(confidence));
        }

        Ok(Self {
            frame_id,
            object_type: object_type.into(),
            bbox,
            confidence,
            description: description.into(),
            track_id,
        })
    }

    /// Wire record for this region.
    pub fn to_record(&self) -> RegionRecord {
        RegionRecord {
            frame_id: self.frame_id,
            object_type: self.object_type.clone(),
            bbox: self.bbox.to_array(),
            confidence: self.confidence,
            description: self.description.clone(),
            track_id: self.track_id,
        }
    }
}

fn default_object_type() -> String {
    "unknown".to_string()
}

fn default_confidence() -> f64 {
    1.0
}

/// Raw region entry as it appears on the wire.
///
/// `frame_id` and `bbox` are mandatory; the remaining fields take the
/// defaults manual annotation tools omit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegionRecord {
    pub frame_id: u32,

    #[serde(default = "default_object_type")]
    pub object_type: String,

    /// `[x, y, w, h]` in source-video pixels
    pub bbox: [i32; 4],

    #[serde(default = "default_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub track_id: Option<u32>,
}

impl TryFrom<RegionRecord> for DetectionRegion {
    type Error = RegionError;

    fn try_from(record: RegionRecord) -> Result<Self, Self::Error> {
        DetectionRegion::new(
            record.frame_id,
            record.object_type,
            BBox::from(record.bbox),
            record.confidence,
            record.description,
            record.track_id,
        )
    }
}

/// The `{"regions": [...]}` interchange document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegionSet {
    pub regions: Vec<RegionRecord>,
}

impl RegionSet {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate every record into a [`DetectionRegion`] list, preserving
    /// order. The first bad record aborts the conversion.
    pub fn into_regions(self) -> Result<Vec<DetectionRegion>, RegionError> {
        self.regions.into_iter().map(DetectionRegion::try_from).collect()
    }

    /// Build from validated regions.
    pub fn from_regions(regions: &[DetectionRegion]) -> Self {
        Self {
            regions: regions.iter().map(DetectionRegion::to_record).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }
}
