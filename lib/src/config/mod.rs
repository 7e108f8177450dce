//! Configuration for the slicing phase.
//!
//! - [`Settings`] - string key/value store with parent inheritance
//! - [`SliceConfig`] - typed global settings (layer heights, cleanup, offsets)
//! - [`MeshSettings`] - typed per-mesh settings (surface mode, stitching)

mod mesh_settings;
mod settings;
mod slice_config;

pub use mesh_settings::{MeshSettings, SurfaceMode};
pub use settings::Settings;
pub use slice_config::{AdhesionType, SliceConfig, SlicingTolerance};
