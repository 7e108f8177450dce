//! Sliced output: one [`SlicerLayer`] per layer, gathered in a [`LayerStack`].

use super::layer_plan::LayerBand;
use super::stats::SliceStats;
use crate::config::{MeshSettings, SurfaceMode};
use crate::geometry::{BoundingBox, Polygon, Polyline};
use crate::{unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Cross-section of a mesh at one layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlicerLayer {
    pub index: usize,
    pub slice_z: Coord,
    pub bottom_z: Coord,
    pub top_z: Coord,
    /// Outlines (CCW) and holes (CW).
    pub polygons: Vec<Polygon>,
    /// Chains that could not be closed, when the mesh keeps them.
    pub open_polylines: Vec<Polyline>,
}

impl SlicerLayer {
    /// An empty layer for a band.
    pub fn new(band: &LayerBand) -> Self {
        Self {
            index: band.index,
            slice_z: band.slice_z,
            bottom_z: band.bottom_z,
            top_z: band.top_z,
            polygons: Vec::new(),
            open_polylines: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.open_polylines.is_empty()
    }

    #[inline]
    pub fn slice_z_mm(&self) -> CoordF {
        unscale(self.slice_z)
    }

    #[inline]
    pub fn thickness_mm(&self) -> CoordF {
        unscale(self.top_z - self.bottom_z)
    }

    /// Net filled area in mm² (outlines minus holes).
    pub fn area(&self) -> CoordF {
        let scaled: CoordF = self.polygons.iter().map(Polygon::signed_area).sum();
        scaled / (crate::SCALING_FACTOR * crate::SCALING_FACTOR)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::new();
        for p in &self.polygons {
            for &pt in p.points() {
                bb.merge_point(pt);
            }
        }
        for pl in &self.open_polylines {
            for &pt in pl.points() {
                bb.merge_point(pt);
            }
        }
        bb
    }
}

/// How the layers of a mesh are used downstream. Slicing never changes
/// geometry based on these.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshRole {
    pub surface_mode: SurfaceMode,
    pub cutting_mesh: bool,
    pub infill_mesh: bool,
    pub support_mesh: bool,
    pub anti_overhang_mesh: bool,
}

impl MeshRole {
    pub fn from_settings(settings: &MeshSettings) -> Self {
        Self {
            surface_mode: settings.surface_mode,
            cutting_mesh: settings.cutting_mesh,
            infill_mesh: settings.infill_mesh,
            support_mesh: settings.support_mesh,
            anti_overhang_mesh: settings.anti_overhang_mesh,
        }
    }

    /// A mesh that modifies others rather than being printed as a part.
    pub fn is_modifier(&self) -> bool {
        self.cutting_mesh || self.infill_mesh || self.support_mesh || self.anti_overhang_mesh
    }
}

/// All layers of one mesh, in layer order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    pub layers: Vec<SlicerLayer>,
    pub role: MeshRole,
    pub stats: SliceStats,
}

impl LayerStack {
    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SlicerLayer> {
        self.layers.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlicerLayer> {
        self.layers.iter()
    }

    /// Index of the first layer with any geometry.
    pub fn first_non_empty(&self) -> Option<usize> {
        self.layers.iter().position(|l| !l.is_empty())
    }
}

impl Index<usize> for LayerStack {
    type Output = SlicerLayer;

    fn index(&self, index: usize) -> &SlicerLayer {
        &self.layers[index]
    }
}

impl<'a> IntoIterator for &'a LayerStack {
    type Item = &'a SlicerLayer;
    type IntoIter = std::slice::Iter<'a, SlicerLayer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

impl IntoIterator for LayerStack {
    type Item = SlicerLayer;
    type IntoIter = std::vec::IntoIter<SlicerLayer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.into_iter()
    }
}
