//! The per-frame region table.

use std::collections::BTreeMap;

use crate::region::{DetectionRegion, RegionSet};

/// Mapping from frame id to the regions known for that frame.
///
/// Built once from a detection list and queried once per output frame.
/// Keys exist only for frame ids that appeared in the detection source;
/// queries for other ids go through the interpolation policy, which lives
/// in `vmask-media`. Within a frame, regions keep their input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionTable {
    map: BTreeMap<u32, Vec<DetectionRegion>>,
}

impl RegionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a detection list by frame id.
    pub fn from_regions(regions: Vec<DetectionRegion>) -> Self {
        let mut table = Self::new();
        for region in regions {
            table.insert(region);
        }
        table
    }

    /// Add one region, appending to its frame's list.
    pub fn insert(&mut self, region: DetectionRegion) {
        self.map.entry(region.frame_id).or_default().push(region);
    }

    /// Regions for an exact frame id, if the id is a keyframe.
    pub fn get(&self, frame_id: u32) -> Option<&[DetectionRegion]> {
        self.map.get(&frame_id).map(Vec::as_slice)
    }

    /// Sorted keyframe ids.
    pub fn keyframe_ids(&self) -> Vec<u32> {
        self.map.keys().copied().collect()
    }

    /// Number of distinct keyframes.
    pub fn keyframe_count(&self) -> usize {
        self.map.len()
    }

    /// Total number of regions across all keyframes.
    pub fn region_count(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate keyframes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[DetectionRegion])> {
        self.map.iter().map(|(id, regions)| (*id, regions.as_slice()))
    }

    /// Flatten back into a detection list, keyframe order.
    pub fn all_regions(&self) -> Vec<DetectionRegion> {
        self.map.values().flatten().cloned().collect()
    }

    /// Serialize to the `regions.json` interchange format.
    pub fn to_region_set(&self) -> RegionSet {
        RegionSet::from_regions(&self.all_regions())
    }
}
