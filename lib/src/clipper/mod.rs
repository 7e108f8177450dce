//! Polygon boolean and offset operations.
//!
//! Thin layer over `geo`'s boolean operations and buffering. Slice layers are
//! flat lists of signed polygons (CCW outlines, CW holes) with no explicit
//! nesting, so every operation first resolves its input with the non-zero
//! fill rule: overlapping outlines merge, holes cut, islands inside holes
//! stay solid. Results are flattened back with outlines CCW and holes CW.
//!
//! Coordinates cross the boundary in millimetres.

use crate::geometry::{Point, Polygon};
use crate::{scale, unscale, CoordF};
use geo::algorithm::area::Area;
use geo::algorithm::bool_ops::{BooleanOps, FillRule, OpType};
use geo::algorithm::buffer::{Buffer, BufferStyle, LineJoin};
use geo::algorithm::orient::{Direction, Orient};
use geo::{Coord as GeoCoord, LineString, MultiPolygon, Polygon as GeoPolygon};

/// Join type for offset corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetJoinType {
    /// Corners cut off flat
    Square,
    /// Round corners
    #[default]
    Round,
    /// Mitered corners
    Miter,
}

impl From<OffsetJoinType> for LineJoin<f64> {
    fn from(jt: OffsetJoinType) -> Self {
        match jt {
            OffsetJoinType::Square => LineJoin::Bevel,
            // Arc segment length relative to the radius
            OffsetJoinType::Round => LineJoin::Round(0.05),
            // Corners sharper than this angle are beveled
            OffsetJoinType::Miter => LineJoin::Miter(std::f64::consts::FRAC_PI_4),
        }
    }
}

fn ring_from_points(points: &[Point]) -> LineString<f64> {
    LineString::new(
        points
            .iter()
            .map(|p| GeoCoord {
                x: unscale(p.x),
                y: unscale(p.y),
            })
            .collect(),
    )
}

/// Every polygon becomes its own exterior ring, orientation preserved.
/// Not a valid geometry by itself; resolve it with a fill rule.
fn to_raw_multi_polygon(polygons: &[Polygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(
        polygons
            .iter()
            .filter(|p| p.len() >= 3)
            .map(|p| GeoPolygon::new(ring_from_points(p.points()), vec![]))
            .collect(),
    )
}

/// Resolve signed polygons into a valid multipolygon using the non-zero
/// fill rule.
pub fn normalize(polygons: &[Polygon]) -> MultiPolygon<f64> {
    let empty: MultiPolygon<f64> = MultiPolygon::new(vec![]);
    to_raw_multi_polygon(polygons).boolean_op_with_fill_rule(&empty, OpType::Union, FillRule::NonZero)
}

fn ring_to_polygon(ring: &LineString<f64>) -> Option<Polygon> {
    let mut points: Vec<Point> = Vec::with_capacity(ring.0.len());
    for c in ring.coords() {
        let p = Point::new(scale(c.x), scale(c.y));
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    (points.len() >= 3).then(|| Polygon::from_points(points))
}

/// Flatten a multipolygon: exteriors CCW, interiors CW.
pub fn from_multi_polygon(mp: &MultiPolygon<f64>) -> Vec<Polygon> {
    let mut result = Vec::new();
    for poly in mp.iter() {
        if let Some(mut outer) = ring_to_polygon(poly.exterior()) {
            outer.make_counter_clockwise();
            result.push(outer);
        }
        for interior in poly.interiors() {
            if let Some(mut hole) = ring_to_polygon(interior) {
                hole.make_clockwise();
                result.push(hole);
            }
        }
    }
    result.retain(|p| p.signed_area_2x() != 0);
    result
}

fn boolean(subject: &[Polygon], clip: &[Polygon], op: OpType) -> Vec<Polygon> {
    let result = normalize(subject).boolean_op_with_fill_rule(&normalize(clip), op, FillRule::NonZero);
    from_multi_polygon(&result)
}

/// Union of two polygon sets.
pub fn union(subject: &[Polygon], clip: &[Polygon]) -> Vec<Polygon> {
    boolean(subject, clip, OpType::Union)
}

/// Area covered by `subject` but not by `clip`.
pub fn difference(subject: &[Polygon], clip: &[Polygon]) -> Vec<Polygon> {
    boolean(subject, clip, OpType::Difference)
}

pub fn intersection(subject: &[Polygon], clip: &[Polygon]) -> Vec<Polygon> {
    boolean(subject, clip, OpType::Intersection)
}

/// Area covered by exactly one of the two sets.
pub fn xor(subject: &[Polygon], clip: &[Polygon]) -> Vec<Polygon> {
    boolean(subject, clip, OpType::Xor)
}

/// Offset a polygon set by `delta` millimetres (positive grows).
///
/// A zero delta returns the input unchanged, without going through the
/// backend.
pub fn offset_polygons(polygons: &[Polygon], delta: CoordF, join_type: OffsetJoinType) -> Vec<Polygon> {
    if delta == 0.0 {
        return polygons.to_vec();
    }
    let style = BufferStyle::new(delta).line_join(join_type.into());
    from_multi_polygon(&normalize(polygons).buffer_with_style(style))
}

/// Offset the holes of a polygon set by `delta` millimetres; positive makes
/// holes larger. Holes whose equivalent diameter (that of a circle of the same
/// area) is below `min_diameter` are left alone.
pub fn offset_holes(polygons: &[Polygon], delta: CoordF, min_diameter: CoordF) -> Vec<Polygon> {
    if delta == 0.0 {
        return polygons.to_vec();
    }
    let min_area = std::f64::consts::FRAC_PI_4 * min_diameter * min_diameter;
    let style = BufferStyle::new(delta).line_join(OffsetJoinType::Round.into());

    let parts = normalize(polygons);
    let mut result: Vec<GeoPolygon<f64>> = Vec::with_capacity(parts.0.len());
    for part in parts.iter() {
        if part.interiors().is_empty() {
            result.push(part.clone());
            continue;
        }

        let mut holes: Vec<GeoPolygon<f64>> = Vec::with_capacity(part.interiors().len());
        for interior in part.interiors() {
            let hole = GeoPolygon::new(interior.clone(), vec![]);
            if hole.unsigned_area() >= min_area {
                holes.extend(hole.buffer_with_style(style.clone()));
            } else {
                holes.push(hole);
            }
        }
        let holes = MultiPolygon::new(holes).orient(Direction::Default);
        let outline = GeoPolygon::new(part.exterior().clone(), vec![]);
        result.extend(outline.boolean_op_with_fill_rule(&holes, OpType::Difference, FillRule::NonZero));
    }
    from_multi_polygon(&MultiPolygon::new(result))
}

/// Filled area of a polygon set in mm².
pub fn area(polygons: &[Polygon]) -> CoordF {
    normalize(polygons).unsigned_area()
}

/// Area of the symmetric difference divided by the sum of both areas.
/// Zero for identical shapes, one for disjoint ones.
pub fn relative_hamming_distance(a: &[Polygon], b: &[Polygon]) -> CoordF {
    let na = normalize(a);
    let nb = normalize(b);
    let total = na.unsigned_area() + nb.unsigned_area();
    if total <= 0.0 {
        return 0.0;
    }
    na.boolean_op_with_fill_rule(&nb, OpType::Xor, FillRule::NonZero)
        .unsigned_area()
        / total
}
