//! Per-mesh settings.
//!
//! These flags decide how a mesh's imperfections are handled (open chains,
//! extensive stitching) and which role its layers play downstream.

use super::Settings;
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether a mesh is treated as a solid, a bare surface, or both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceMode {
    #[default]
    Normal,
    Surface,
    Both,
}

impl FromStr for SurfaceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "surface" => Ok(Self::Surface),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown surface mode '{}'", other)),
        }
    }
}

/// Settings attached to one mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshSettings {
    pub surface_mode: SurfaceMode,
    pub cutting_mesh: bool,
    pub infill_mesh: bool,
    pub support_mesh: bool,
    pub anti_overhang_mesh: bool,
    /// Bridge gaps between open chains up to `extensive_stitching_distance`.
    pub extensive_stitching: bool,
    /// Largest gap extensive stitching will bridge (mm).
    pub extensive_stitching_distance: CoordF,
    /// Keep chains that could not be closed as open polylines.
    pub keep_open_polygons: bool,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            surface_mode: SurfaceMode::Normal,
            cutting_mesh: false,
            infill_mesh: false,
            support_mesh: false,
            anti_overhang_mesh: false,
            extensive_stitching: false,
            extensive_stitching_distance: 10.0,
            keep_open_polygons: false,
        }
    }
}

impl MeshSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let d = Self::default();
        let mesh = Self {
            surface_mode: settings.get_or("magic_mesh_surface_mode", d.surface_mode)?,
            cutting_mesh: settings.get_or("cutting_mesh", d.cutting_mesh)?,
            infill_mesh: settings.get_or("infill_mesh", d.infill_mesh)?,
            support_mesh: settings.get_or("support_mesh", d.support_mesh)?,
            anti_overhang_mesh: settings.get_or("anti_overhang_mesh", d.anti_overhang_mesh)?,
            extensive_stitching: settings.get_or("meshfix_extensive_stitching", d.extensive_stitching)?,
            extensive_stitching_distance: settings.get_or(
                "meshfix_extensive_stitching_distance",
                d.extensive_stitching_distance,
            )?,
            keep_open_polygons: settings.get_or("meshfix_keep_open_polygons", d.keep_open_polygons)?,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn surface_mode(mut self, mode: SurfaceMode) -> Self {
        self.surface_mode = mode;
        self
    }

    pub fn extensive_stitching(mut self, distance: CoordF) -> Self {
        self.extensive_stitching = true;
        self.extensive_stitching_distance = distance;
        self
    }

    pub fn keep_open_polygons(mut self, keep: bool) -> Self {
        self.keep_open_polygons = keep;
        self
    }

    /// Open chains survive post-processing.
    pub fn keeps_open_polylines(&self) -> bool {
        self.keep_open_polygons || self.surface_mode != SurfaceMode::Normal
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.extensive_stitching_distance.is_finite() && self.extensive_stitching_distance >= 0.0) {
            return Err(Error::Config(format!(
                "meshfix_extensive_stitching_distance must not be negative, got {}",
                self.extensive_stitching_distance
            )));
        }
        Ok(())
    }
}
