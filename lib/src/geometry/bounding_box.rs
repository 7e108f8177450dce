//! Axis-aligned bounding boxes.

use super::{Point, Point3};
use crate::{unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};

/// 2D axis-aligned bounding box in scaled coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
    pub defined: bool,
}

impl BoundingBox {
    /// An empty (undefined) box.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    pub fn merge_point(&mut self, p: Point) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        if other.defined {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    pub fn width(&self) -> Coord {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Coord {
        self.max.y - self.min.y
    }
}

/// 3D axis-aligned bounding box in scaled coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    pub min: Point3,
    pub max: Point3,
    pub defined: bool,
}

impl BoundingBox3 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_point(&mut self, p: Point3) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.min.z = self.min.z.min(p.z);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
            self.max.z = self.max.z.max(p.z);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    /// Height of the box in millimetres (0 when undefined).
    pub fn height_mm(&self) -> CoordF {
        if self.defined {
            unscale(self.max.z - self.min.z)
        } else {
            0.0
        }
    }

    /// Top of the box in millimetres (0 when undefined).
    pub fn max_z_mm(&self) -> CoordF {
        if self.defined {
            unscale(self.max.z)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_merge() {
        let bb = BoundingBox::from_points(&[Point::new(5, -3), Point::new(-2, 8), Point::new(1, 1)]);
        assert!(bb.defined);
        assert_eq!(bb.min, Point::new(-2, -3));
        assert_eq!(bb.max, Point::new(5, 8));
        assert_eq!(bb.width(), 7);
        assert_eq!(bb.height(), 11);

        let mut empty = BoundingBox::new();
        empty.merge(&BoundingBox::new());
        assert!(!empty.defined);
        empty.merge(&bb);
        assert_eq!(empty, bb);
    }

    #[test]
    fn test_bounding_box3() {
        let mut bb = BoundingBox3::new();
        assert_eq!(bb.max_z_mm(), 0.0);
        bb.merge_point(Point3::new(0, 0, 1_000_000));
        bb.merge_point(Point3::new(0, 0, 11_000_000));
        assert!((bb.height_mm() - 10.0).abs() < 1e-12);
        assert!((bb.max_z_mm() - 11.0).abs() < 1e-12);
    }
}
