//! Primitive mesh builders. All faces are wound counter-clockwise seen from
//! outside.

use super::TriangleMesh;
use crate::geometry::Point3F;
use crate::CoordF;

impl TriangleMesh {
    /// Axis-aligned box spanning `min`..`max` (12 triangles).
    pub fn cuboid(min: Point3F, max: Point3F) -> Self {
        let v = [
            Point3F::new(min.x, min.y, min.z),
            Point3F::new(max.x, min.y, min.z),
            Point3F::new(max.x, max.y, min.z),
            Point3F::new(min.x, max.y, min.z),
            Point3F::new(min.x, min.y, max.z),
            Point3F::new(max.x, min.y, max.z),
            Point3F::new(max.x, max.y, max.z),
            Point3F::new(min.x, max.y, max.z),
        ];
        const FACES: [[usize; 3]; 12] = [
            // bottom (-z)
            [0, 2, 1],
            [0, 3, 2],
            // top (+z)
            [4, 5, 6],
            [4, 6, 7],
            // front (-y)
            [0, 1, 5],
            [0, 5, 4],
            // back (+y)
            [3, 7, 6],
            [3, 6, 2],
            // left (-x)
            [0, 4, 7],
            [0, 7, 3],
            // right (+x)
            [1, 2, 6],
            [1, 6, 5],
        ];
        let triangles: Vec<[Point3F; 3]> = FACES.iter().map(|f| [v[f[0]], v[f[1]], v[f[2]]]).collect();
        Self::from_triangles(&triangles)
    }

    /// Cube of edge `size` with its base corner at the origin.
    pub fn cube(size: CoordF) -> Self {
        Self::cuboid(Point3F::new(0.0, 0.0, 0.0), Point3F::new(size, size, size))
    }

    /// Closed cylinder around the z axis from z = 0 to `height`, with the
    /// circle approximated by `segments` sides (at least 3).
    pub fn cylinder(radius: CoordF, height: CoordF, segments: usize) -> Self {
        let segments = segments.max(3);
        let ring = |z: CoordF| -> Vec<Point3F> {
            (0..segments)
                .map(|i| {
                    let a = i as CoordF / segments as CoordF * std::f64::consts::TAU;
                    Point3F::new(radius * a.cos(), radius * a.sin(), z)
                })
                .collect()
        };
        let bottom = ring(0.0);
        let top = ring(height);
        let bottom_center = Point3F::new(0.0, 0.0, 0.0);
        let top_center = Point3F::new(0.0, 0.0, height);

        let mut triangles = Vec::with_capacity(segments * 4);
        for i in 0..segments {
            let j = (i + 1) % segments;
            triangles.push([bottom[i], bottom[j], top[j]]);
            triangles.push([bottom[i], top[j], top[i]]);
            triangles.push([bottom_center, bottom[j], bottom[i]]);
            triangles.push([top_center, top[i], top[j]]);
        }
        Self::from_triangles(&triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    /// Signed volume via the divergence theorem; positive for outward winding.
    fn signed_volume(mesh: &TriangleMesh) -> f64 {
        (0..mesh.face_count())
            .map(|f| {
                let [a, b, c] = mesh.face_positions(f).map(|p: Point3| p.to_f64());
                (a.x * (b.y * c.z - b.z * c.y) - a.y * (b.x * c.z - b.z * c.x)
                    + a.z * (b.x * c.y - b.y * c.x))
                    / 6.0
            })
            .sum()
    }

    #[test]
    fn test_cuboid_is_closed_and_outward() {
        let mesh = TriangleMesh::cuboid(Point3F::new(0.0, 0.0, 0.0), Point3F::new(2.0, 3.0, 4.0));
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert!(mesh.is_closed());
        assert!((signed_volume(&mesh) - 24.0).abs() < 1e-6);
    }

    #[test]
    fn test_cylinder_is_closed_and_outward() {
        let mesh = TriangleMesh::cylinder(1.0, 2.0, 64);
        assert!(mesh.is_closed());
        assert_eq!(mesh.vertex_count(), 2 * 64 + 2);
        let expected = 0.5 * 64.0 * (std::f64::consts::TAU / 64.0).sin() * 2.0;
        assert!((signed_volume(&mesh) - expected).abs() < 1e-6);
    }
}
