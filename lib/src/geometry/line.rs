//! Line segment type.
//!
//! Besides the segment itself this module hosts the point/line distance and
//! line/line intersection helpers the simplifier is built on. All distances
//! are exact integer arithmetic in scaled units.

use super::{round_div, Point};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A line segment defined by two endpoints.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    /// Create a new line segment from two points.
    #[inline]
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Create a line from coordinates.
    #[inline]
    pub const fn from_coords(ax: Coord, ay: Coord, bx: Coord, by: Coord) -> Self {
        Self {
            a: Point::new(ax, ay),
            b: Point::new(bx, by),
        }
    }

    /// Get the direction vector (b - a).
    #[inline]
    pub fn direction(&self) -> Point {
        self.b - self.a
    }

    /// Get the squared length of the line segment.
    #[inline]
    pub fn length_squared(&self) -> i128 {
        self.a.distance_squared(&self.b)
    }

    /// Get the length of the line segment.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    /// Check if this line segment is a point (zero length).
    #[inline]
    pub fn is_point(&self) -> bool {
        self.a == self.b
    }

    /// Reverse the direction of the line segment.
    #[inline]
    pub fn reverse(&self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }

    /// Squared distance from a point to the segment `a`-`b`.
    pub fn distance_to_squared(p: Point, a: Point, b: Point) -> i128 {
        let proj = p.project_onto_segment(a, b);
        p.distance_squared(&proj)
    }

    /// Squared distance from a point to the infinite line through `a` and `b`.
    ///
    /// Degenerates to the distance to `a` when `a == b`.
    pub fn distance_to_infinite_squared(p: Point, a: Point, b: Point) -> i128 {
        let dir = b - a;
        let len_sq = dir.length_squared();
        if len_sq == 0 {
            return p.distance_squared(&a);
        }

        // Distance² = cross(b-a, p-a)² / |b-a|²
        let cross = dir.cross(&(p - a));
        cross * cross / len_sq
    }

    /// Intersection point of the infinite lines through two segments.
    /// Returns None when the lines are parallel.
    pub fn intersection_infinite(&self, other: &Line) -> Option<Point> {
        let d1 = self.direction();
        let d2 = other.direction();

        let cross = d1.cross(&d2);
        if cross == 0 {
            return None;
        }

        let diff = other.a - self.a;
        let t_num = diff.cross(&d2);

        // Parameters far outside the segments still produce a point; the
        // caller bounds the deviation.
        let x = self.a.x as i128 + round_div(d1.x as i128 * t_num, cross);
        let y = self.a.y as i128 + round_div(d1.y as i128 * t_num, cross);
        if x.abs() > Coord::MAX as i128 || y.abs() > Coord::MAX as i128 {
            return None;
        }
        Some(Point::new(x as Coord, y as Coord))
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?} -> {:?})", self.a, self.b)
    }
}

impl From<(Point, Point)> for Line {
    fn from((a, b): (Point, Point)) -> Self {
        Self::new(a, b)
    }
}
