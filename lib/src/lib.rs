//! # Contour Slicer
//!
//! The mesh-to-layers phase of a 3D printing slicer: a triangle mesh goes in,
//! one set of closed 2D contours per layer comes out.
//!
//! The phase is split into small, separately testable stages:
//! - Segment extraction: every triangle crossing a layer plane yields one
//!   oriented segment whose endpoints carry topological keys
//! - Stitching: segments are joined into closed loops by key, with numeric
//!   snapping and optional gap bridging for imperfect meshes
//! - Post-processing: small-polygon removal, resolution-bounded
//!   simplification, planar and hole offsets
//!
//! Layers are processed in parallel on a rayon pool and returned in order.
//!
//! ## Example
//!
//! ```rust,ignore
//! use contour_slicer::{Point3F, SliceConfig, Slicer, TriangleMesh};
//!
//! let mesh = TriangleMesh::cuboid(Point3F::new(0.0, 0.0, 0.0), Point3F::new(10.0, 10.0, 10.0));
//! let slicer = Slicer::new(SliceConfig::default());
//! let plan = slicer.plan_for(&mesh);
//! let layers = slicer.slice(&mesh, &plan)?;
//! assert_eq!(layers.len(), plan.layer_count());
//! ```

pub mod clipper;
pub mod config;
pub mod geometry;
pub mod mesh;
pub mod slice;

pub use config::{
    AdhesionType, MeshSettings, Settings, SliceConfig, SlicingTolerance, SurfaceMode,
};
pub use geometry::{
    BoundingBox, BoundingBox3, Line, Point, Point3, Point3F, Polygon, Polygons, Polyline,
    Polylines, SimplifyConfig,
};
pub use mesh::{MeshFace, MeshVertex, TriangleMesh};
pub use slice::{
    AdaptiveLayer, EndpointKey, LayerBand, LayerPlan, LayerStack, MeshRole, SliceStats,
    Slicer, SlicerLayer, SlicerSegment, StitchConfig,
};

/// Coordinate type used throughout the slicer.
/// Using i64 for integer coordinates (scaled by SCALING_FACTOR) to avoid floating-point issues.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values (millimetres).
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 nanometer, so 1mm = 1_000_000 units.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Scale a floating-point coordinate to integer.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Result type used throughout the slicer.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for slicer operations.
///
/// Malformed meshes are never an error; they are counted in
/// [`SliceStats`]. Only configuration problems and resource exhaustion
/// abort the phase.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing setting: {0}")]
    MissingSetting(String),

    #[error("Invalid value {value:?} for setting {key}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("Invalid layer plan at layer {layer}: {reason}")]
    LayerPlan { layer: usize, reason: String },

    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Out of memory while allocating layer storage: {0}")]
    Allocation(#[from] std::collections::TryReserveError),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
