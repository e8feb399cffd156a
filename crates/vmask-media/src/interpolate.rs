//! Sparse-to-dense region resolution.

use vmask_models::{DetectionRegion, RegionTable};

/// Resolves the regions that apply to any frame from a sparse keyframe
/// table.
///
/// The policy is a nearest-keyframe hold, not a motion model: an exact key
/// returns its regions verbatim; any other frame returns the regions of the
/// closest keyframe, unchanged. Two adjacent keyframes therefore produce a
/// hard cut at their midpoint. Equal distances resolve to the smaller key;
/// this tie-break is a documented contract, observable by callers.
///
/// Resolution is a pure function of `(frame_id, table)`.
pub struct RegionInterpolator<'a> {
    table: &'a RegionTable,
    keys: Vec<u32>,
}

impl<'a> RegionInterpolator<'a> {
    pub fn new(table: &'a RegionTable) -> Self {
        Self {
            table,
            keys: table.keyframe_ids(),
        }
    }

    /// Regions applying to `frame_id`. An empty table yields an empty slice
    /// for every query.
    pub fn resolve(&self, frame_id: u32) -> &'a [DetectionRegion] {
        if let Some(regions) = self.table.get(frame_id) {
            return regions;
        }

        let nearest = match self.keys.binary_search(&frame_id) {
            Ok(i) => self.keys[i],
            Err(0) => match self.keys.first() {
                Some(first) => *first,
                None => return &[],
            },
            Err(i) if i == self.keys.len() => self.keys[i - 1],
            Err(i) => {
                let below = self.keys[i - 1];
                let above = self.keys[i];
                // Tie goes to the smaller key
                if frame_id - below <= above - frame_id {
                    below
                } else {
                    above
                }
            }
        };

        self.table.get(nearest).unwrap_or(&[])
    }

    /// Sorted keyframe ids backing this interpolator.
    pub fn keyframe_ids(&self) -> &[u32] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmask_models::BBox;

    fn region(frame_id: u32, tag: &str) -> DetectionRegion {
        DetectionRegion::new(frame_id, tag, BBox::new(0, 0, 10, 10), 1.0, "", None).unwrap()
    }

    fn table(ids: &[(u32, &str)]) -> RegionTable {
        RegionTable::from_regions(ids.iter().map(|(id, tag)| region(*id, tag)).collect())
    }

    #[test]
    fn test_exact_key_returns_verbatim() {
        let table = table(&[(10, "a"), (50, "b")]);
        let interp = RegionInterpolator::new(&table);

        assert_eq!(interp.resolve(50)[0].object_type, "b");
    }

    #[test]
    fn test_nearest_key_below_and_above() {
        let table = table(&[(10, "a"), (50, "b")]);
        let interp = RegionInterpolator::new(&table);

        assert_eq!(interp.resolve(15)[0].object_type, "a");
        assert_eq!(interp.resolve(45)[0].object_type, "b");
    }

    #[test]
    fn test_tie_breaks_to_smaller_key() {
        // Frame 30 is exactly 20 away from both keys; the smaller wins.
        let table = table(&[(10, "a"), (50, "b")]);
        let interp = RegionInterpolator::new(&table);

        assert_eq!(interp.resolve(30)[0].object_type, "a");
    }

    #[test]
    fn test_out_of_range_clamps_to_edge_keys() {
        let table = table(&[(10, "a"), (50, "b")]);
        let interp = RegionInterpolator::new(&table);

        assert_eq!(interp.resolve(1)[0].object_type, "a");
        assert_eq!(interp.resolve(400)[0].object_type, "b");
    }

    #[test]
    fn test_empty_table_yields_empty_everywhere() {
        let table = RegionTable::new();
        let interp = RegionInterpolator::new(&table);

        assert!(interp.resolve(1).is_empty());
        assert!(interp.resolve(12345).is_empty());
    }

    #[test]
    fn test_resolution_is_pure() {
        let table = table(&[(10, "a"), (50, "b")]);
        let interp = RegionInterpolator::new(&table);

        let first: Vec<_> = interp.resolve(30).to_vec();
        let second: Vec<_> = interp.resolve(30).to_vec();
        assert_eq!(first, second);
    }
}
