//! Diagnostics gathered while slicing one mesh.

use super::stitcher::StitchReport;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Counters describing how clean the input was and what the slicer had to
/// do about it. Summed over all layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceStats {
    // === Mesh ===
    pub degenerate_faces: usize,
    pub boundary_edges: usize,
    pub non_manifold_edges: usize,

    // === Stitching ===
    pub segments: usize,
    pub exact_joins: usize,
    pub snapped_joins: usize,
    pub merged_chains: usize,
    pub extensive_joins: usize,
    pub degenerate_loops: usize,

    // === Output ===
    pub closed_polygons: usize,
    pub open_polylines_kept: usize,
    pub open_chains_dropped: usize,
    pub small_polygons_removed: usize,
}

impl SliceStats {
    pub fn add_stitch_report(&mut self, report: &StitchReport) {
        self.segments += report.segments;
        self.exact_joins += report.exact_joins;
        self.snapped_joins += report.snapped_joins;
        self.merged_chains += report.merged_chains;
        self.extensive_joins += report.extensive_joins;
        self.degenerate_loops += report.degenerate_loops;
    }

    /// Whether anything had to be repaired or thrown away.
    pub fn has_repairs(&self) -> bool {
        self.degenerate_faces > 0
            || self.snapped_joins > 0
            || self.extensive_joins > 0
            || self.degenerate_loops > 0
            || self.open_chains_dropped > 0
    }
}

impl AddAssign for SliceStats {
    fn add_assign(&mut self, other: Self) {
        self.degenerate_faces += other.degenerate_faces;
        self.boundary_edges += other.boundary_edges;
        self.non_manifold_edges += other.non_manifold_edges;
        self.segments += other.segments;
        self.exact_joins += other.exact_joins;
        self.snapped_joins += other.snapped_joins;
        self.merged_chains += other.merged_chains;
        self.extensive_joins += other.extensive_joins;
        self.degenerate_loops += other.degenerate_loops;
        self.closed_polygons += other.closed_polygons;
        self.open_polylines_kept += other.open_polylines_kept;
        self.open_chains_dropped += other.open_chains_dropped;
        self.small_polygons_removed += other.small_polygons_removed;
    }
}
