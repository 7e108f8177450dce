//! Slicer - the main slicing orchestrator.
//!
//! Runs the whole phase for one mesh: plan the layer bands, cut every face
//! against every plane it crosses, then stitch and clean each layer on the
//! rayon pool. Layers come back in index order.

use super::layer::{LayerStack, MeshRole, SlicerLayer};
use super::layer_plan::LayerPlan;
use super::post_process::LayerProcessor;
use super::segment::extract_segments;
use super::stats::SliceStats;
use super::stitcher::{stitch_segments, StitchConfig};
use crate::config::{Settings, SliceConfig};
use crate::mesh::TriangleMesh;
use crate::{unscale, Coord, Result};
use log::{debug, info, warn};
use rayon::prelude::*;

/// Slices meshes into layers.
#[derive(Debug, Clone, Default)]
pub struct Slicer {
    config: SliceConfig,
}

impl Slicer {
    pub fn new(config: SliceConfig) -> Self {
        Self { config }
    }

    /// Create a slicer from a settings store.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(SliceConfig::from_settings(settings)?))
    }

    pub fn config(&self) -> &SliceConfig {
        &self.config
    }

    /// Plan for the whole height of `mesh` using the configured layer heights.
    pub fn plan_for(&self, mesh: &TriangleMesh) -> LayerPlan {
        LayerPlan::from_config(&self.config, mesh.bounding_box().max_z_mm(), None)
    }

    /// Slice a mesh according to a layer plan.
    ///
    /// Returns exactly `plan.layer_count()` layers. Imperfect meshes are not
    /// an error; what had to be repaired or dropped is reported in the
    /// stack's stats.
    pub fn slice(&self, mesh: &TriangleMesh, plan: &LayerPlan) -> Result<LayerStack> {
        self.config.validate()?;
        mesh.settings().validate()?;

        let bands = plan.bands(self.config.slicing_tolerance, self.config.effective_z_overlap())?;
        debug!(
            "Slicing {} faces into {} layers ({} tolerance)",
            mesh.face_count(),
            bands.len(),
            self.config.slicing_tolerance
        );
        if mesh.is_empty() {
            warn!("Mesh has no faces; all {} layers will be empty", bands.len());
        }

        let slice_z: Vec<Coord> = bands.iter().map(|b| b.slice_z).collect();
        let extracted = extract_segments(mesh, &slice_z);

        let mut stats = SliceStats {
            degenerate_faces: extracted.degenerate_faces,
            boundary_edges: mesh.boundary_edge_count(),
            non_manifold_edges: mesh.non_manifold_edge_count(),
            ..Default::default()
        };
        if stats.degenerate_faces > 0 {
            warn!("Skipped {} degenerate faces", stats.degenerate_faces);
        }
        if !mesh.is_closed() {
            warn!(
                "Mesh is not closed: {} boundary edges, {} non-manifold edges",
                stats.boundary_edges,
                stats.non_manifold_edges
            );
        }

        let stitch_config = StitchConfig::from_mesh_settings(mesh.settings());
        let processor = LayerProcessor::new(&self.config, mesh.settings());

        let mut processed: Vec<(SlicerLayer, SliceStats)> = Vec::new();
        processed.try_reserve_exact(bands.len())?;
        bands
            .par_iter()
            .zip(extracted.layers.into_par_iter())
            .map(|(band, segments)| {
                let stitched = stitch_segments(&segments, &stitch_config);
                processor.process(band, stitched)
            })
            .collect_into_vec(&mut processed);

        let mut layers: Vec<SlicerLayer> = Vec::new();
        layers.try_reserve_exact(processed.len())?;
        for (layer, layer_stats) in processed {
            if layer_stats.open_chains_dropped > 0 {
                warn!(
                    "Layer {} (z = {:.3}): dropped {} open chains",
                    layer.index,
                    unscale(layer.slice_z),
                    layer_stats.open_chains_dropped
                );
            }
            stats += layer_stats;
            layers.push(layer);
        }

        info!(
            "Sliced {} layers: {} polygons, {} open polylines, {} segments",
            layers.len(),
            stats.closed_polygons,
            stats.open_polylines_kept,
            stats.segments
        );
        if stats.snapped_joins > 0 || stats.extensive_joins > 0 {
            debug!(
                "Stitching repaired {} snapped and {} extensive gaps",
                stats.snapped_joins,
                stats.extensive_joins
            );
        }

        Ok(LayerStack {
            layers,
            role: MeshRole::from_settings(mesh.settings()),
            stats,
        })
    }
}
