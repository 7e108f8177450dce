//! Closed polygon type.
//!
//! A polygon's closing edge (last point back to the first) is implicit.
//! Orientation carries meaning: counter-clockwise polygons are outer
//! boundaries, clockwise polygons are holes.

use super::{BoundingBox, Line, Point};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// A closed polygon defined by a sequence of points.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

/// A list of polygons.
pub type Polygons = Vec<Polygon>;

impl Polygon {
    /// Create a new empty polygon.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polygon from a vector of points.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Create an axis-aligned rectangle (CCW) from two corners in scaled units.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::from_points(vec![
            min,
            Point::new(max.x, min.y),
            max,
            Point::new(min.x, max.y),
        ])
    }

    /// Get the points of this polygon.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get a mutable reference to the points.
    #[inline]
    pub fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }

    /// Consume the polygon and return its points.
    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = Line> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| Line::new(self.points[i], self.points[(i + 1) % n]))
    }

    /// Twice the signed area, exact.
    pub fn signed_area_2x(&self) -> i128 {
        let n = self.points.len();
        if n < 3 {
            return 0;
        }
        let mut sum: i128 = 0;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            sum += p.cross(&q);
        }
        sum
    }

    /// Signed area in scaled units squared. Positive for CCW polygons.
    pub fn signed_area(&self) -> CoordF {
        self.signed_area_2x() as CoordF / 2.0
    }

    /// Absolute area in scaled units squared.
    pub fn area(&self) -> CoordF {
        self.signed_area().abs()
    }

    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area_2x() > 0
    }

    /// A hole is a polygon wound clockwise.
    #[inline]
    pub fn is_hole(&self) -> bool {
        self.signed_area_2x() < 0
    }

    /// Perimeter length including the closing edge (scaled units).
    pub fn perimeter(&self) -> CoordF {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.edges().map(|e| e.length()).sum()
    }

    /// Whether the perimeter is below `length`. Stops summing as soon as
    /// the answer is known.
    pub fn shorter_than(&self, length: Coord) -> bool {
        let limit = length as CoordF;
        let mut total = 0.0;
        for edge in self.edges() {
            total += edge.length();
            if total >= limit {
                return false;
            }
        }
        true
    }

    /// Reverse the winding in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Ensure counter-clockwise winding. Returns true if reversed.
    pub fn make_counter_clockwise(&mut self) -> bool {
        if self.signed_area_2x() < 0 {
            self.reverse();
            true
        } else {
            false
        }
    }

    /// Ensure clockwise winding. Returns true if reversed.
    pub fn make_clockwise(&mut self) -> bool {
        if self.signed_area_2x() > 0 {
            self.reverse();
            true
        } else {
            false
        }
    }

    /// Point-in-polygon by crossing number. Points on the boundary may go
    /// either way.
    pub fn contains_point(&self, p: &Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            if (pi.y > p.y) != (pj.y > p.y) {
                // x of the edge at height p.y, compared without division
                let lhs = (p.x - pi.x) as i128 * (pj.y - pi.y) as i128;
                let rhs = (pj.x - pi.x) as i128 * (p.y - pi.y) as i128;
                if (pj.y > pi.y) == (lhs < rhs) {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Bounding box of the points.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }
}

impl Index<usize> for Polygon {
    type Output = Point;

    #[inline]
    fn index(&self, index: usize) -> &Point {
        &self.points[index]
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polygon{:?}", self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: Coord) -> Polygon {
        Polygon::rectangle(Point::new(0, 0), Point::new(size, size))
    }

    #[test]
    fn test_area_and_winding() {
        let mut sq = square(100);
        assert!((sq.signed_area() - 10_000.0).abs() < 1e-9);
        assert!(sq.is_counter_clockwise());
        assert!(!sq.is_hole());

        sq.reverse();
        assert!((sq.signed_area() + 10_000.0).abs() < 1e-9);
        assert!(sq.is_hole());

        assert!(sq.make_counter_clockwise());
        assert!(!sq.make_counter_clockwise());
        assert!(sq.make_clockwise());
    }

    #[test]
    fn test_perimeter() {
        let sq = square(100);
        assert!((sq.perimeter() - 400.0).abs() < 1e-9);
        assert!(sq.shorter_than(401));
        assert!(!sq.shorter_than(400));
        assert!(!sq.shorter_than(50));
    }

    #[test]
    fn test_contains_point() {
        let sq = square(100);
        assert!(sq.contains_point(&Point::new(50, 50)));
        assert!(!sq.contains_point(&Point::new(150, 50)));
        assert!(!sq.contains_point(&Point::new(50, -1)));

        let mut hole = square(100);
        hole.reverse();
        // Containment ignores winding
        assert!(hole.contains_point(&Point::new(10, 90)));
    }

    #[test]
    fn test_degenerate_polygon() {
        let line = Polygon::from_points(vec![Point::new(0, 0), Point::new(10, 0)]);
        assert_eq!(line.signed_area_2x(), 0);
        assert!(!line.contains_point(&Point::new(5, 0)));
    }
}
