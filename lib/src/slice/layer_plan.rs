//! Layer height planning.
//!
//! A plan is either a uniform pitch (first layer plus equal layers) or an
//! explicit table of adaptive layers. Either way it is consumed through
//! [`LayerPlan::bands`], which yields one height band per layer and the z at
//! which the mesh is sampled for it.

use crate::config::{SliceConfig, SlicingTolerance};
use crate::{scale, unscale, Coord, CoordF, Error, Result};
use serde::{Deserialize, Serialize};

/// One entry of an adaptive layer table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveLayer {
    /// Top of the layer (mm).
    pub z_position: CoordF,
    /// Thickness of the layer (mm).
    pub layer_height: CoordF,
}

impl AdaptiveLayer {
    pub fn new(z_position: CoordF, layer_height: CoordF) -> Self {
        Self {
            z_position,
            layer_height,
        }
    }
}

/// The z extent of one layer, in scaled coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerBand {
    pub index: usize,
    pub bottom_z: Coord,
    pub top_z: Coord,
    /// Height of the slicing plane.
    pub slice_z: Coord,
}

impl LayerBand {
    #[inline]
    pub fn thickness(&self) -> Coord {
        self.top_z - self.bottom_z
    }
}

/// Heights of all layers of one mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LayerPlan {
    Uniform {
        first_layer_height: CoordF,
        layer_height: CoordF,
        layer_count: usize,
    },
    Adaptive(Vec<AdaptiveLayer>),
}

impl LayerPlan {
    pub fn uniform(first_layer_height: CoordF, layer_height: CoordF, layer_count: usize) -> Self {
        Self::Uniform {
            first_layer_height,
            layer_height,
            layer_count,
        }
    }

    /// Uniform plan covering an object of the given height: the first layer,
    /// then as many full layers as fit on top of it.
    ///
    /// The count is computed in scaled integers so that heights which are
    /// exact multiples of the pitch are not lost to rounding.
    pub fn uniform_for_height(first_layer_height: CoordF, layer_height: CoordF, height: CoordF) -> Self {
        let h0 = scale(first_layer_height);
        let h = scale(layer_height);
        let layer_count = if h > 0 && height.is_finite() {
            let layers = (scale(height) - h0).div_euclid(h) + 1;
            usize::try_from(layers).unwrap_or(0)
        } else {
            0
        };
        Self::uniform(first_layer_height, layer_height, layer_count)
    }

    /// Plan for an object of the given height. An adaptive table, when
    /// given, takes precedence over the configured uniform heights.
    pub fn from_config(config: &SliceConfig, height: CoordF, adaptive: Option<Vec<AdaptiveLayer>>) -> Self {
        match adaptive {
            Some(layers) => Self::Adaptive(layers),
            None => Self::uniform_for_height(config.layer_height_0, config.layer_height, height),
        }
    }

    pub fn layer_count(&self) -> usize {
        match self {
            Self::Uniform { layer_count, .. } => *layer_count,
            Self::Adaptive(layers) => layers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layer_count() == 0
    }

    /// Compute every layer's band and slicing height.
    ///
    /// `z_overlap` raises the top of the first layer and shifts every later
    /// layer up by the same amount (the model sinks into a raft's first
    /// layer). Fails when a thickness is not positive or the slicing
    /// heights do not strictly increase.
    pub fn bands(&self, tolerance: SlicingTolerance, z_overlap: CoordF) -> Result<Vec<LayerBand>> {
        if !(z_overlap.is_finite() && z_overlap >= 0.0) {
            return Err(Error::LayerPlan {
                layer: 0,
                reason: format!("z overlap must be a non-negative number, got {}", z_overlap),
            });
        }
        let overlap = scale(z_overlap);

        let raw = match self {
            Self::Uniform {
                first_layer_height,
                layer_height,
                layer_count,
            } => uniform_extents(*first_layer_height, *layer_height, *layer_count)?,
            Self::Adaptive(layers) => adaptive_extents(layers)?,
        };

        let mut bands: Vec<LayerBand> = Vec::new();
        bands.try_reserve_exact(raw.len())?;
        for (index, (bottom_z, top_z)) in raw.into_iter().enumerate() {
            let shifted_bottom = if index == 0 { Some(bottom_z) } else { bottom_z.checked_add(overlap) };
            let (bottom_z, top_z) = shifted_bottom
                .zip(top_z.checked_add(overlap))
                .ok_or_else(|| out_of_range(index))?;
            // A plane exactly on the band bottom would see a face resting
            // there as entirely above it, so Lower samples one unit inside.
            let slice_z = match tolerance {
                SlicingTolerance::Middle => bottom_z + (top_z - bottom_z) / 2,
                SlicingTolerance::Upper => top_z,
                SlicingTolerance::Lower => bottom_z + 1,
            };
            if let Some(prev) = bands.last().map(|b| b.slice_z) {
                if slice_z <= prev {
                    return Err(Error::LayerPlan {
                        layer: index,
                        reason: format!(
                            "slicing height {:.6} mm does not increase over the previous layer ({:.6} mm)",
                            unscale(slice_z),
                            unscale(prev)
                        ),
                    });
                }
            }
            bands.push(LayerBand {
                index,
                bottom_z,
                top_z,
                slice_z,
            });
        }
        Ok(bands)
    }
}

fn check_thickness(layer: usize, height: CoordF) -> Result<Coord> {
    let scaled = if height.is_finite() { scale(height) } else { 0 };
    if scaled <= 0 {
        return Err(Error::LayerPlan {
            layer,
            reason: format!("layer thickness must be positive, got {}", height),
        });
    }
    Ok(scaled)
}

fn out_of_range(layer: usize) -> Error {
    Error::LayerPlan {
        layer,
        reason: "layer heights exceed the coordinate range".into(),
    }
}

fn uniform_extents(first_layer_height: CoordF, layer_height: CoordF, count: usize) -> Result<Vec<(Coord, Coord)>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let h0 = check_thickness(0, first_layer_height)?;
    let h = if count > 1 {
        check_thickness(1, layer_height)?
    } else {
        0
    };

    let mut extents = Vec::new();
    extents.try_reserve_exact(count)?;
    extents.push((0, h0));
    let mut bottom = h0;
    for index in 1..count {
        let top = bottom.checked_add(h).ok_or_else(|| out_of_range(index))?;
        extents.push((bottom, top));
        bottom = top;
    }
    Ok(extents)
}

fn adaptive_extents(layers: &[AdaptiveLayer]) -> Result<Vec<(Coord, Coord)>> {
    let mut extents: Vec<(Coord, Coord)> = Vec::new();
    extents.try_reserve_exact(layers.len())?;
    for (index, layer) in layers.iter().enumerate() {
        let h = check_thickness(index, layer.layer_height)?;
        if !layer.z_position.is_finite() {
            return Err(Error::LayerPlan {
                layer: index,
                reason: format!("layer z must be finite, got {}", layer.z_position),
            });
        }
        let top = scale(layer.z_position);
        if let Some(&(_, prev_top)) = extents.last() {
            if top <= prev_top {
                return Err(Error::LayerPlan {
                    layer: index,
                    reason: format!(
                        "layer z {} mm does not increase over the previous layer ({} mm)",
                        layer.z_position,
                        unscale(prev_top)
                    ),
                });
            }
        }
        let bottom = top.checked_sub(h).ok_or_else(|| out_of_range(index))?;
        extents.push((bottom, top));
    }
    Ok(extents)
}
