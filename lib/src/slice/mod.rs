//! Slicing module - converts meshes into layers.
//!
//! - [`LayerPlan`] - uniform or adaptive layer heights
//! - [`segment`] - triangle/plane intersection with topological endpoint keys
//! - [`stitcher`] - joins segments into closed polygons
//! - [`post_process`] - per-layer cleanup and offsets
//! - [`Slicer`] - runs the phase for one mesh and returns a [`LayerStack`]

mod layer;
mod layer_plan;
pub mod post_process;
pub mod segment;
mod slicer;
mod stats;
pub mod stitcher;

pub use layer::{LayerStack, MeshRole, SlicerLayer};
pub use layer_plan::{AdaptiveLayer, LayerBand, LayerPlan};
pub use segment::{extract_segments, EndpointKey, SlicerSegment};
pub use slicer::Slicer;
pub use stats::SliceStats;
pub use stitcher::{stitch_segments, StitchConfig, StitchReport};
