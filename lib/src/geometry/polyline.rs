//! Polyline type for open paths.
//!
//! Slice chains that could not be closed end up as polylines. Unlike a
//! [`Polygon`], a polyline has no implicit closing edge.

use super::{BoundingBox, Line, Point, Polygon};
use crate::{Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// An open polyline defined by a sequence of points.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

/// A list of polylines.
pub type Polylines = Vec<Polyline>;

impl Polyline {
    /// Create a new empty polyline.
    #[inline]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polyline from a vector of points.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Get the points of this polyline.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get a mutable reference to the points.
    #[inline]
    pub fn points_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }

    /// Consume the polyline and return its points.
    #[inline]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Get the number of points in the polyline.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the polyline is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the first point.
    #[inline]
    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    /// Get the last point.
    #[inline]
    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Iterate over the segments of the path.
    pub fn edges(&self) -> impl Iterator<Item = Line> + '_ {
        self.points.windows(2).map(|w| Line::new(w[0], w[1]))
    }

    /// Total path length (scaled units).
    pub fn length(&self) -> CoordF {
        self.edges().map(|e| e.length()).sum()
    }

    /// Whether the path length is below `length`.
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

    /// Reverse the direction in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Append another polyline's points, skipping a duplicated joint.
    pub fn append(&mut self, other: &Polyline) {
        let skip = usize::from(self.points.last().is_some() && self.points.last() == other.first());
        self.points.extend_from_slice(&other.points[skip..]);
    }

    /// Close the path into a polygon. A repeated end point is dropped.
    pub fn into_polygon(mut self) -> Polygon {
        if self.points.len() > 1 && self.points.first() == self.points.last() {
            self.points.pop();
        }
        Polygon::from_points(self.points)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }
}

impl fmt::Debug for Polyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polyline{:?}", self.points)
    }
}

impl Index<usize> for Polyline {
    type Output = Point;

    #[inline]
    fn index(&self, index: usize) -> &Point {
        &self.points[index]
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}
