//! Geometry primitives for the slicer.
//!
//! This module provides the geometric types the slicing phase works with:
//! - [`Point`] and [`Point3`] - 2D and 3D points with integer coordinates (scaled)
//! - [`Point3F`] - 3D point with floating-point coordinates (unscaled, mm)
//! - [`Line`] - Line segment between two points
//! - [`Polygon`] - Closed polygon (outer boundary when CCW, hole when CW)
//! - [`Polyline`] - Open polyline (unclosed slice chain)
//! - [`BoundingBox`] and [`BoundingBox3`] - Axis-aligned bounding boxes
//!
//! ## Coordinate System
//!
//! The slicer uses scaled integer coordinates internally to avoid floating-point precision issues.
//! Coordinates are scaled by `SCALING_FACTOR` (1,000,000), so 1 unit = 1 nanometer.
//!
//! - Use `scale()` to convert from mm to internal units
//! - Use `unscale()` to convert from internal units to mm

mod bounding_box;
mod line;
mod point;
mod polygon;
mod polyline;
pub mod simplify;

pub use bounding_box::{BoundingBox, BoundingBox3};
pub use line::Line;
pub use point::{Point, Point3, Point3F, Points};
pub use polygon::{Polygon, Polygons};
pub use polyline::{Polyline, Polylines};
pub use simplify::{
    remove_degenerate_vertices, simplify_polygon, simplify_polyline, SimplifyConfig,
    MESHFIX_MAXIMUM_DEVIATION, MESHFIX_MAXIMUM_EXTRUSION_AREA_DEVIATION, MESHFIX_MAXIMUM_RESOLUTION,
    MINIMUM_SEGMENT_LENGTH,
};

/// Integer division rounding half away from zero. `d` must be non-zero.
#[inline]
pub fn round_div(n: i128, d: i128) -> i128 {
    let (n, d) = if d < 0 { (-n, -d) } else { (n, d) };
    if n >= 0 {
        (n + d / 2) / d
    } else {
        (n - d / 2) / d
    }
}
