//! Per-layer cleanup between stitching and output.
//!
//! Steps run in a fixed order: open chain policy, minimum circumference,
//! simplification, planar offsets.

use super::layer::SlicerLayer;
use super::layer_plan::LayerBand;
use super::stats::SliceStats;
use super::stitcher::StitchResult;
use crate::clipper::{self, OffsetJoinType};
use crate::config::{MeshSettings, SliceConfig};
use crate::geometry::{
    remove_degenerate_vertices, simplify_polygon, simplify_polyline, Polygon, Polyline, SimplifyConfig,
};
use crate::{scale, Coord};

/// Turns one layer's stitched loops into its final polygons.
#[derive(Debug, Clone)]
pub struct LayerProcessor {
    keep_open: bool,
    min_circumference: Coord,
    simplify: SimplifyConfig,
    xy_offset: f64,
    xy_offset_layer_0: f64,
    hole_xy_offset: f64,
    hole_min_diameter: f64,
}

impl LayerProcessor {
    pub fn new(config: &SliceConfig, mesh: &MeshSettings) -> Self {
        Self {
            keep_open: mesh.keeps_open_polylines(),
            min_circumference: scale(config.minimum_polygon_circumference),
            simplify: config.simplify_config(),
            xy_offset: config.xy_offset_for_layer(1),
            xy_offset_layer_0: config.xy_offset_for_layer(0),
            hole_xy_offset: config.hole_xy_offset,
            hole_min_diameter: config.hole_xy_offset_min_diameter,
        }
    }

    /// Build the layer for `band` and count what was removed.
    pub fn process(&self, band: &LayerBand, stitched: StitchResult) -> (SlicerLayer, SliceStats) {
        let mut stats = SliceStats::default();
        stats.add_stitch_report(&stitched.report);

        let StitchResult {
            mut polygons,
            open_chains,
            ..
        } = stitched;

        let mut open_polylines = if self.keep_open {
            open_chains
        } else {
            stats.open_chains_dropped += open_chains.len();
            Vec::new()
        };

        let before = polygons.len() + open_polylines.len();
        polygons.retain(|p| !p.shorter_than(self.min_circumference));
        open_polylines.retain(|p| !p.shorter_than(self.min_circumference));
        stats.small_polygons_removed += before - polygons.len() - open_polylines.len();

        let mut polygons = self.simplify_polygons(&polygons);
        let open_polylines = self.simplify_polylines(&open_polylines);

        let offset = if band.index == 0 {
            self.xy_offset_layer_0
        } else {
            self.xy_offset
        };
        if offset != 0.0 {
            polygons = clipper::offset_polygons(&polygons, offset, OffsetJoinType::Round);
        }
        if self.hole_xy_offset != 0.0 {
            polygons = clipper::offset_holes(&polygons, self.hole_xy_offset, self.hole_min_diameter);
        }

        stats.closed_polygons = polygons.len();
        stats.open_polylines_kept = open_polylines.len();

        let mut layer = SlicerLayer::new(band);
        layer.polygons = polygons;
        layer.open_polylines = open_polylines;
        (layer, stats)
    }

    fn simplify_polygons(&self, polygons: &[Polygon]) -> Vec<Polygon> {
        polygons
            .iter()
            .filter_map(|p| {
                let mut simplified = simplify_polygon(p, &self.simplify);
                remove_degenerate_vertices(simplified.points_mut(), true);
                (simplified.len() >= 3 && simplified.signed_area_2x() != 0).then_some(simplified)
            })
            .collect()
    }

    fn simplify_polylines(&self, polylines: &[Polyline]) -> Vec<Polyline> {
        polylines
            .iter()
            .filter_map(|p| {
                let mut simplified = simplify_polyline(p, &self.simplify);
                remove_degenerate_vertices(simplified.points_mut(), false);
                (simplified.len() >= 2).then_some(simplified)
            })
            .collect()
    }
}
