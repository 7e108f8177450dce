//! Indexed triangle mesh.
//!
//! The mesh is built once and shared read-only by every slicing worker.
//! Vertices are welded by exact scaled position so that faces sharing an edge
//! reference the same vertex indices; the segment extractor relies on this to
//! produce matching endpoint keys on both sides of an edge.
//!
//! Face edge `i` runs from corner `i` to corner `(i + 1) % 3`. For each edge
//! the face records the neighbouring face across it, if any.

mod primitives;

use crate::config::MeshSettings;
use crate::geometry::{BoundingBox3, Point3, Point3F};
use crate::{Error, Result};
use log::{debug, warn};
use std::collections::HashMap;

/// A welded mesh vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshVertex {
    /// Position in scaled coordinates.
    pub position: Point3,
    /// Faces using this vertex, ascending.
    pub connected_faces: Vec<usize>,
}

/// A triangle referencing three welded vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshFace {
    pub vertex_index: [usize; 3],
    /// Neighbour across edge `i` (corner `i` to corner `i + 1`).
    pub connected_face_index: [Option<usize>; 3],
}

impl MeshFace {
    /// A face is degenerate when two of its corners are the same vertex.
    #[inline]
    pub fn has_repeated_vertex(&self) -> bool {
        let [a, b, c] = self.vertex_index;
        a == b || b == c || a == c
    }
}

/// An immutable triangle mesh with adjacency information.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    vertices: Vec<MeshVertex>,
    faces: Vec<MeshFace>,
    bounding_box: BoundingBox3,
    boundary_edges: usize,
    non_manifold_edges: usize,
    settings: MeshSettings,
}

impl TriangleMesh {
    /// Build a mesh from a triangle soup, welding identical positions.
    ///
    /// Triangles with a non-finite coordinate are left out.
    pub fn from_triangles(triangles: &[[Point3F; 3]]) -> Self {
        let mut index_of: HashMap<Point3, usize> = HashMap::with_capacity(triangles.len());
        let mut positions: Vec<Point3> = Vec::with_capacity(triangles.len() / 2 + 3);
        let mut faces: Vec<[usize; 3]> = Vec::with_capacity(triangles.len());

        let mut skipped = 0;
        for tri in triangles {
            if !tri.iter().all(Point3F::is_finite) {
                skipped += 1;
                continue;
            }
            let mut face = [0usize; 3];
            for (corner, p) in face.iter_mut().zip(tri.iter()) {
                let scaled = p.to_scaled();
                *corner = *index_of.entry(scaled).or_insert_with(|| {
                    positions.push(scaled);
                    positions.len() - 1
                });
            }
            faces.push(face);
        }
        if skipped > 0 {
            warn!("Skipped {} triangles with non-finite coordinates", skipped);
        }

        Self::build(positions, faces)
    }

    /// Build a mesh from shared vertex positions and index triples.
    ///
    /// Positions are welded as in [`TriangleMesh::from_triangles`]. Fails on
    /// out-of-range indices or non-finite coordinates.
    pub fn from_indexed(positions: &[Point3F], faces: &[[usize; 3]]) -> Result<Self> {
        if let Some((i, _)) = positions.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(Error::Mesh(format!("vertex {} has a non-finite coordinate", i)));
        }
        if let Some((f, face)) = faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&v| v >= positions.len()))
        {
            return Err(Error::Mesh(format!(
                "face {} references vertex {:?} but the mesh has {} vertices",
                f,
                face,
                positions.len()
            )));
        }

        let mut index_of: HashMap<Point3, usize> = HashMap::with_capacity(positions.len());
        let mut welded: Vec<Point3> = Vec::with_capacity(positions.len());
        let remap: Vec<usize> = positions
            .iter()
            .map(|p| {
                let scaled = p.to_scaled();
                *index_of.entry(scaled).or_insert_with(|| {
                    welded.push(scaled);
                    welded.len() - 1
                })
            })
            .collect();

        let faces = faces
            .iter()
            .map(|f| [remap[f[0]], remap[f[1]], remap[f[2]]])
            .collect();
        Ok(Self::build(welded, faces))
    }

    fn build(positions: Vec<Point3>, face_indices: Vec<[usize; 3]>) -> Self {
        let mut bounding_box = BoundingBox3::new();
        let mut vertices: Vec<MeshVertex> = positions
            .into_iter()
            .map(|position| {
                MeshVertex {
                    position,
                    connected_faces: Vec::new(),
                }
            })
            .collect();

        // Undirected edge -> (face, edge index) in face order
        let mut edge_faces: HashMap<(usize, usize), Vec<(usize, usize)>> =
            HashMap::with_capacity(face_indices.len() * 3 / 2);

        for (f, face) in face_indices.iter().enumerate() {
            for corner in 0..3 {
                let v = face[corner];
                let vertex = &mut vertices[v];
                if vertex.connected_faces.last() != Some(&f) {
                    vertex.connected_faces.push(f);
                }
                bounding_box.merge_point(vertex.position);

                let w = face[(corner + 1) % 3];
                if v != w {
                    edge_faces.entry((v.min(w), v.max(w))).or_default().push((f, corner));
                }
            }
        }

        let mut faces: Vec<MeshFace> = face_indices
            .iter()
            .map(|&vertex_index| MeshFace {
                vertex_index,
                connected_face_index: [None; 3],
            })
            .collect();

        let mut boundary_edges = 0;
        let mut non_manifold_edges = 0;
        for users in edge_faces.values() {
            match users.len() {
                1 => boundary_edges += 1,
                2 => {}
                _ => non_manifold_edges += 1,
            }
        }

        for (f, face) in face_indices.iter().enumerate() {
            for corner in 0..3 {
                let v = face[corner];
                let w = face[(corner + 1) % 3];
                if v == w {
                    continue;
                }
                let Some(users) = edge_faces.get(&(v.min(w), v.max(w))) else {
                    continue;
                };
                // Prefer a face walking the edge the other way (consistent
                // winding), then any other face; lowest index first.
                let opposite = users.iter().find(|&&(g, c)| {
                    g != f && face_indices[g][c] == w && face_indices[g][(c + 1) % 3] == v
                });
                let neighbor = opposite.or_else(|| users.iter().find(|&&(g, _)| g != f));
                faces[f].connected_face_index[corner] = neighbor.map(|&(g, _)| g);
            }
        }

        if boundary_edges > 0 || non_manifold_edges > 0 {
            debug!(
                "Mesh has {} boundary and {} non-manifold edges",
                boundary_edges,
                non_manifold_edges
            );
        }

        Self {
            vertices,
            faces,
            bounding_box,
            boundary_edges,
            non_manifold_edges,
            settings: MeshSettings::default(),
        }
    }

    /// Attach mesh-level settings.
    pub fn with_settings(mut self, settings: MeshSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &MeshSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: MeshSettings) {
        self.settings = settings;
    }

    #[inline]
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    #[inline]
    pub fn faces(&self) -> &[MeshFace] {
        &self.faces
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The three corner positions of a face.
    #[inline]
    pub fn face_positions(&self, face: usize) -> [Point3; 3] {
        let [a, b, c] = self.faces[face].vertex_index;
        [
            self.vertices[a].position,
            self.vertices[b].position,
            self.vertices[c].position,
        ]
    }

    /// Face across edge `edge` of `face`.
    #[inline]
    pub fn connected_face(&self, face: usize, edge: usize) -> Option<usize> {
        self.faces[face].connected_face_index[edge]
    }

    /// Whether a face can never produce a slice segment: repeated corners or
    /// collinear corners.
    pub fn is_degenerate_face(&self, face: usize) -> bool {
        if self.faces[face].has_repeated_vertex() {
            return true;
        }
        let [a, b, c] = self.face_positions(face);
        let u = b - a;
        let v = c - a;
        let (ux, uy, uz) = (u.x as i128, u.y as i128, u.z as i128);
        let (vx, vy, vz) = (v.x as i128, v.y as i128, v.z as i128);
        uy * vz - uz * vy == 0 && uz * vx - ux * vz == 0 && ux * vy - uy * vx == 0
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox3 {
        &self.bounding_box
    }

    /// Edges used by exactly one face.
    #[inline]
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges
    }

    /// Edges used by more than two faces.
    #[inline]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.non_manifold_edges
    }

    /// A mesh is closed when every edge has exactly two faces.
    pub fn is_closed(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0
    }
}
