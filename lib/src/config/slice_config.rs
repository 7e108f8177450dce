//! Global slicing configuration.
//!
//! Typed view over the settings the slicing phase reads. Lengths are in
//! millimetres, areas in square millimetres.

use super::Settings;
use crate::geometry::SimplifyConfig;
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where inside a layer's height band the mesh is sampled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlicingTolerance {
    /// Slice at the middle of the layer.
    #[default]
    Middle,
    /// Slice at the top of the layer (the layer contains everything below).
    Upper,
    /// Slice just above the bottom of the layer (one scaled unit).
    Lower,
}

impl FromStr for SlicingTolerance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "middle" | "midpoint" => Ok(Self::Middle),
            "upper" | "upper_bound" | "inclusive" => Ok(Self::Upper),
            "lower" | "lower_bound" | "exclusive" => Ok(Self::Lower),
            other => Err(format!("unknown slicing tolerance '{}'", other)),
        }
    }
}

impl fmt::Display for SlicingTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Middle => "middle",
            Self::Upper => "upper",
            Self::Lower => "lower",
        };
        f.write_str(name)
    }
}

/// Build plate adhesion type. Only `Raft` changes how layers are sliced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdhesionType {
    None,
    #[default]
    Skirt,
    Brim,
    Raft,
}

impl FromStr for AdhesionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "skirt" => Ok(Self::Skirt),
            "brim" => Ok(Self::Brim),
            "raft" => Ok(Self::Raft),
            other => Err(format!("unknown adhesion type '{}'", other)),
        }
    }
}

/// Settings controlling the mesh-to-layers phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliceConfig {
    // === Layer Heights ===
    /// First layer height (mm).
    pub layer_height_0: CoordF,
    /// Height of every other layer (mm).
    pub layer_height: CoordF,
    /// Extra height the first layer sinks into a raft (mm).
    pub layer_0_z_overlap: CoordF,
    /// Sampling position inside each layer.
    pub slicing_tolerance: SlicingTolerance,
    pub adhesion_type: AdhesionType,

    // === Cleanup ===
    /// Closed polygons with a shorter perimeter are removed (mm).
    pub minimum_polygon_circumference: CoordF,
    /// Segments shorter than this may be merged away (mm).
    pub meshfix_maximum_resolution: CoordF,
    /// Maximum distance simplification may move the contour (mm).
    pub meshfix_maximum_deviation: CoordF,
    /// Maximum area change per removed vertex (mm²).
    pub meshfix_maximum_extrusion_area_deviation: CoordF,

    // === Offsets ===
    /// Outward (positive) or inward offset of every layer but the first (mm).
    pub xy_offset: CoordF,
    /// Offset applied to the first layer instead of `xy_offset` (mm).
    pub xy_offset_layer_0: CoordF,
    /// Extra offset for holes; positive makes holes larger (mm).
    pub hole_xy_offset: CoordF,
    /// Holes with a smaller equivalent diameter are not hole-offset (mm).
    pub hole_xy_offset_min_diameter: CoordF,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            layer_height_0: 0.3,
            layer_height: 0.2,
            layer_0_z_overlap: 0.0,
            slicing_tolerance: SlicingTolerance::Middle,
            adhesion_type: AdhesionType::Skirt,
            minimum_polygon_circumference: 1.0,
            meshfix_maximum_resolution: 0.5,
            meshfix_maximum_deviation: 0.025,
            meshfix_maximum_extrusion_area_deviation: 2.0,
            xy_offset: 0.0,
            xy_offset_layer_0: 0.0,
            hole_xy_offset: 0.0,
            hole_xy_offset_min_diameter: 0.0,
        }
    }
}

impl SliceConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every key from a settings store. Missing keys keep their
    /// defaults; malformed values are errors.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let d = Self::default();
        // Older profiles name the hole threshold by its other key
        let hole_key = if settings.has("hole_xy_offset_min_diameter") {
            "hole_xy_offset_min_diameter"
        } else {
            "hole_xy_offset_max_diameter"
        };
        let config = Self {
            layer_height_0: settings.get_or("layer_height_0", d.layer_height_0)?,
            layer_height: settings.get_or("layer_height", d.layer_height)?,
            layer_0_z_overlap: settings.get_or("layer_0_z_overlap", d.layer_0_z_overlap)?,
            slicing_tolerance: settings.get_or("slicing_tolerance", d.slicing_tolerance)?,
            adhesion_type: settings.get_or("adhesion_type", d.adhesion_type)?,
            minimum_polygon_circumference: settings
                .get_or("minimum_polygon_circumference", d.minimum_polygon_circumference)?,
            meshfix_maximum_resolution: settings
                .get_or("meshfix_maximum_resolution", d.meshfix_maximum_resolution)?,
            meshfix_maximum_deviation: settings
                .get_or("meshfix_maximum_deviation", d.meshfix_maximum_deviation)?,
            meshfix_maximum_extrusion_area_deviation: settings.get_or(
                "meshfix_maximum_extrusion_area_deviation",
                d.meshfix_maximum_extrusion_area_deviation,
            )?,
            xy_offset: settings.get_or("xy_offset", d.xy_offset)?,
            xy_offset_layer_0: settings.get_or("xy_offset_layer_0", d.xy_offset_layer_0)?,
            hole_xy_offset: settings.get_or("hole_xy_offset", d.hole_xy_offset)?,
            hole_xy_offset_min_diameter: settings.get_or(hole_key, d.hole_xy_offset_min_diameter)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn layer_height(mut self, height: CoordF) -> Self {
        self.layer_height = height;
        self
    }

    pub fn first_layer_height(mut self, height: CoordF) -> Self {
        self.layer_height_0 = height;
        self
    }

    pub fn slicing_tolerance(mut self, tolerance: SlicingTolerance) -> Self {
        self.slicing_tolerance = tolerance;
        self
    }

    pub fn minimum_polygon_circumference(mut self, length: CoordF) -> Self {
        self.minimum_polygon_circumference = length;
        self
    }

    /// Builder: set the three simplification limits at once.
    pub fn resolution(mut self, max_resolution: CoordF, max_deviation: CoordF, max_area_deviation: CoordF) -> Self {
        self.meshfix_maximum_resolution = max_resolution;
        self.meshfix_maximum_deviation = max_deviation;
        self.meshfix_maximum_extrusion_area_deviation = max_area_deviation;
        self
    }

    pub fn xy_offset(mut self, offset: CoordF) -> Self {
        self.xy_offset = offset;
        self
    }

    pub fn xy_offset_layer_0(mut self, offset: CoordF) -> Self {
        self.xy_offset_layer_0 = offset;
        self
    }

    pub fn hole_offset(mut self, offset: CoordF, min_diameter: CoordF) -> Self {
        self.hole_xy_offset = offset;
        self.hole_xy_offset_min_diameter = min_diameter;
        self
    }

    pub fn raft(mut self, z_overlap: CoordF) -> Self {
        self.adhesion_type = AdhesionType::Raft;
        self.layer_0_z_overlap = z_overlap;
        self
    }

    /// Offset for a layer: the first layer has its own.
    pub fn xy_offset_for_layer(&self, layer_index: usize) -> CoordF {
        if layer_index == 0 {
            self.xy_offset_layer_0
        } else {
            self.xy_offset
        }
    }

    /// Z overlap applied to the layer plan; non-zero only with a raft.
    pub fn effective_z_overlap(&self) -> CoordF {
        if self.adhesion_type == AdhesionType::Raft {
            self.layer_0_z_overlap
        } else {
            0.0
        }
    }

    pub fn simplify_config(&self) -> SimplifyConfig {
        SimplifyConfig::new(
            self.meshfix_maximum_resolution,
            self.meshfix_maximum_deviation,
            self.meshfix_maximum_extrusion_area_deviation,
        )
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("layer_height_0", self.layer_height_0),
            ("layer_height", self.layer_height),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{} must be positive, got {}", key, value)));
            }
        }

        let non_negative = [
            ("layer_0_z_overlap", self.layer_0_z_overlap),
            ("minimum_polygon_circumference", self.minimum_polygon_circumference),
            ("meshfix_maximum_resolution", self.meshfix_maximum_resolution),
            ("meshfix_maximum_deviation", self.meshfix_maximum_deviation),
            (
                "meshfix_maximum_extrusion_area_deviation",
                self.meshfix_maximum_extrusion_area_deviation,
            ),
            ("hole_xy_offset_min_diameter", self.hole_xy_offset_min_diameter),
        ];
        for (key, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Config(format!("{} must not be negative, got {}", key, value)));
            }
        }

        for (key, value) in [
            ("xy_offset", self.xy_offset),
            ("xy_offset_layer_0", self.xy_offset_layer_0),
            ("hole_xy_offset", self.hole_xy_offset),
        ] {
            if !value.is_finite() {
                return Err(Error::Config(format!("{} must be finite", key)));
            }
        }
        Ok(())
    }
}
