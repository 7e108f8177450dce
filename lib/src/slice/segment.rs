//! Triangle/plane intersection.
//!
//! Every triangle crossed by a slicing plane contributes one oriented segment
//! to that layer. Endpoints carry a topological key naming the mesh edge (or
//! on-plane vertex) they lie on, so the stitcher can join segments without
//! comparing coordinates.

use crate::geometry::{round_div, Point, Point3};
use crate::mesh::TriangleMesh;
use crate::Coord;
use rayon::prelude::*;

/// Where on the mesh a segment endpoint lies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EndpointKey {
    /// Strictly inside the edge between two vertices (`lo < hi`).
    Edge { lo: usize, hi: usize },
    /// On a vertex lying exactly in the plane.
    Vertex(usize),
}

impl EndpointKey {
    #[inline]
    pub fn edge(a: usize, b: usize) -> Self {
        Self::Edge {
            lo: a.min(b),
            hi: a.max(b),
        }
    }
}

/// One triangle's cross-section with a slicing plane.
///
/// The mesh exterior lies to the right of `start -> end`, so segments of an
/// outer wall chain into a counter-clockwise loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlicerSegment {
    pub start: Point,
    pub end: Point,
    pub start_key: EndpointKey,
    pub end_key: EndpointKey,
    /// Face the segment was cut from.
    pub face: usize,
    /// Face across the edge the segment ends on; usually the face the next
    /// segment comes from.
    pub end_neighbor: Option<usize>,
}

/// Segments of every layer, in face order.
#[derive(Debug, Default)]
pub struct ExtractedSegments {
    pub layers: Vec<Vec<SlicerSegment>>,
    pub degenerate_faces: usize,
}

impl ExtractedSegments {
    fn with_layers(layer_count: usize) -> Self {
        Self {
            layers: vec![Vec::new(); layer_count],
            degenerate_faces: 0,
        }
    }

    fn append(&mut self, other: Self) {
        for (mine, theirs) in self.layers.iter_mut().zip(other.layers) {
            mine.extend(theirs);
        }
        self.degenerate_faces += other.degenerate_faces;
    }
}

/// Crossing of the plane with the mesh edge between two corners.
fn edge_crossing(
    vertex: [usize; 3],
    pos: &[Point3; 3],
    a: usize,
    b: usize,
    z: Coord,
) -> (Point, EndpointKey) {
    for c in [a, b] {
        if pos[c].z == z {
            return (pos[c].xy(), EndpointKey::Vertex(vertex[c]));
        }
    }

    // Interpolate from the lower vertex index so that both faces sharing the
    // edge produce the same point.
    let (p, q) = if vertex[a] < vertex[b] {
        (pos[a], pos[b])
    } else {
        (pos[b], pos[a])
    };
    let dz = (q.z - p.z) as i128;
    let t = (z - p.z) as i128;
    let x = p.x + round_div((q.x - p.x) as i128 * t, dz) as Coord;
    let y = p.y + round_div((q.y - p.y) as i128 * t, dz) as Coord;
    (Point::new(x, y), EndpointKey::edge(vertex[a], vertex[b]))
}

/// Intersect one face with the plane at `z`.
///
/// A corner at or above the plane counts as above. Returns `None` unless the
/// corners are split one/two, and for zero-length results.
pub fn slice_face(mesh: &TriangleMesh, face: usize, z: Coord) -> Option<SlicerSegment> {
    let vertex = mesh.faces()[face].vertex_index;
    let pos = mesh.face_positions(face);
    let above = [pos[0].z >= z, pos[1].z >= z, pos[2].z >= z];

    let (k, lone_above) = match above.iter().filter(|&&a| a).count() {
        1 => (above.iter().position(|&a| a)?, true),
        2 => (above.iter().position(|&a| !a)?, false),
        _ => return None,
    };
    let k1 = (k + 1) % 3;
    let k2 = (k + 2) % 3;

    // (start corner, end corner, face edge index the segment ends on)
    let (s, e, end_edge) = if lone_above { (k1, k2, k2) } else { (k2, k1, k) };

    let (start, start_key) = edge_crossing(vertex, &pos, k, s, z);
    let (end, end_key) = edge_crossing(vertex, &pos, k, e, z);
    if start == end {
        return None;
    }

    Some(SlicerSegment {
        start,
        end,
        start_key,
        end_key,
        face,
        end_neighbor: mesh.connected_face(face, end_edge),
    })
}

/// Cut every face against every slicing height it spans.
///
/// `slice_z` must be sorted ascending. Degenerate faces are skipped and
/// counted. Buckets keep face order regardless of how work was split.
pub fn extract_segments(mesh: &TriangleMesh, slice_z: &[Coord]) -> ExtractedSegments {
    let layer_count = slice_z.len();
    if layer_count == 0 {
        return ExtractedSegments::default();
    }

    (0..mesh.face_count())
        .into_par_iter()
        .with_min_len(256)
        .fold(
            || ExtractedSegments::with_layers(layer_count),
            |mut acc, face| {
                if mesh.is_degenerate_face(face) {
                    acc.degenerate_faces += 1;
                    return acc;
                }
                let pos = mesh.face_positions(face);
                let min_z = pos.iter().map(|p| p.z).min().unwrap_or(0);
                let max_z = pos.iter().map(|p| p.z).max().unwrap_or(0);

                // Layers with min_z < z <= max_z
                let first = slice_z.partition_point(|&z| z <= min_z);
                let last = slice_z.partition_point(|&z| z <= max_z);
                for layer in first..last {
                    if let Some(segment) = slice_face(mesh, face, slice_z[layer]) {
                        acc.layers[layer].push(segment);
                    }
                }
                acc
            },
        )
        .reduce(
            || ExtractedSegments::with_layers(layer_count),
            |mut left, right| {
                left.append(right);
                left
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3F;
    use crate::scale;

    fn cube() -> TriangleMesh {
        TriangleMesh::cube(10.0)
    }

    #[test]
    fn test_front_face_runs_along_x() {
        // The front wall (y = 0) faces -y, so its segments run towards +x.
        let mesh = cube();
        let z = scale(5.0);
        let front: Vec<SlicerSegment> = (0..mesh.face_count())
            .filter_map(|f| slice_face(&mesh, f, z))
            .filter(|s| s.start.y == 0 && s.end.y == 0)
            .collect();
        assert_eq!(front.len(), 2);
        for s in &front {
            assert!(s.end.x > s.start.x);
        }
    }

    #[test]
    fn test_shared_edges_match() {
        let mesh = cube();
        let segments: Vec<SlicerSegment> = (0..mesh.face_count())
            .filter_map(|f| slice_face(&mesh, f, scale(3.3)))
            .collect();
        assert_eq!(segments.len(), 8);
        for s in &segments {
            let next: Vec<_> = segments.iter().filter(|n| n.start_key == s.end_key).collect();
            assert_eq!(next.len(), 1);
            assert_eq!(next[0].start, s.end);
            assert_eq!(s.end_neighbor, Some(next[0].face));
        }
    }

    #[test]
    fn test_vertex_on_plane() {
        let mesh = cube();

        // Bottom face height: every corner counts as above
        assert!((0..mesh.face_count()).all(|f| slice_face(&mesh, f, 0).is_none()));

        // Top face height: the side walls produce the outline through vertex keys
        let top: Vec<SlicerSegment> = (0..mesh.face_count())
            .filter_map(|f| slice_face(&mesh, f, scale(10.0)))
            .collect();
        assert_eq!(top.len(), 4);
        assert!(top
            .iter()
            .all(|s| matches!(s.start_key, EndpointKey::Vertex(_)) && matches!(s.end_key, EndpointKey::Vertex(_))));
    }

    #[test]
    fn test_extract_buckets() {
        let mesh = cube();
        let zs = [scale(-1.0), 0, scale(5.0), scale(10.0), scale(11.0)];
        let extracted = extract_segments(&mesh, &zs);
        let counts: Vec<usize> = extracted.layers.iter().map(Vec::len).collect();
        assert_eq!(counts, vec![0, 0, 8, 4, 0]);
        assert_eq!(extracted.degenerate_faces, 0);

        // Face order within a bucket
        let faces: Vec<usize> = extracted.layers[2].iter().map(|s| s.face).collect();
        let mut sorted = faces.clone();
        sorted.sort_unstable();
        assert_eq!(faces, sorted);
    }

    #[test]
    fn test_degenerate_faces_counted() {
        let p = |x, y, z| Point3F::new(x, y, z);
        let mesh = TriangleMesh::from_triangles(&[
            [p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 1.0, 1.0)],
            // collinear
            [p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0)],
            // repeated corner
            [p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0)],
        ]);
        let extracted = extract_segments(&mesh, &[scale(0.5)]);
        assert_eq!(extracted.degenerate_faces, 2);
        assert_eq!(extracted.layers[0].len(), 1);
    }
}
