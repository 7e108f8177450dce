//! Slicing meshes with holes, duplicates and degenerate triangles.

use contour_slicer::{
    LayerPlan, LayerStack, MeshSettings, Point3F, SliceConfig, Slicer, SurfaceMode, TriangleMesh,
};

fn test_config() -> SliceConfig {
    SliceConfig::new()
        .first_layer_height(0.2)
        .layer_height(0.1)
        .minimum_polygon_circumference(1.0)
        .resolution(0.04, 0.02, 0.002)
}

fn cube_triangles() -> Vec<[Point3F; 3]> {
    let mesh = TriangleMesh::cube(10.0);
    (0..mesh.face_count())
        .map(|f| mesh.face_positions(f).map(|p| p.to_f64()))
        .collect()
}

/// Cube with one of the two triangles of the front wall (y = 0) missing.
fn open_cube() -> Vec<[Point3F; 3]> {
    let mut triangles = cube_triangles();
    let front = triangles
        .iter()
        .position(|t| t.iter().all(|p| p.y == 0.0) && t.iter().filter(|p| p.x == 10.0).count() == 2)
        .unwrap();
    triangles.remove(front);
    triangles
}

fn slice(mesh: &TriangleMesh) -> LayerStack {
    Slicer::new(test_config())
        .slice(mesh, &LayerPlan::uniform_for_height(0.2, 0.1, 10.0))
        .unwrap()
}

#[test]
fn test_open_seam_drops_chains() {
    let mesh = TriangleMesh::from_triangles(&open_cube());
    assert_eq!(mesh.boundary_edge_count(), 3);

    let stack = slice(&mesh);
    assert_eq!(stack.len(), 99);
    assert!(stack.iter().all(|l| l.is_empty()));
    assert_eq!(stack.stats.open_chains_dropped, 99);
    assert_eq!(stack.stats.boundary_edges, 3);
    assert_eq!(stack.stats.closed_polygons, 0);
}

#[test]
fn test_open_seam_kept_as_polylines() {
    let mesh = TriangleMesh::from_triangles(&open_cube())
        .with_settings(MeshSettings::new().surface_mode(SurfaceMode::Both));
    let stack = slice(&mesh);
    assert!(stack.iter().all(|l| l.polygons.is_empty() && l.open_polylines.len() == 1));
    assert_eq!(stack.stats.open_polylines_kept, 99);
    assert_eq!(stack.stats.open_chains_dropped, 0);
    assert_eq!(stack.role.surface_mode, SurfaceMode::Both);
}

#[test]
fn test_extensive_stitching_closes_seam() {
    let mesh = TriangleMesh::from_triangles(&open_cube())
        .with_settings(MeshSettings::new().extensive_stitching(15.0));
    let stack = slice(&mesh);
    for layer in &stack {
        assert_eq!(layer.polygons.len(), 1, "layer {}", layer.index);
        assert_eq!(layer.polygons[0].len(), 4);
        assert!((layer.area() - 100.0).abs() < 1e-6);
    }
    assert_eq!(stack.stats.extensive_joins, 99);
    assert_eq!(stack.stats.open_chains_dropped, 0);
}

#[test]
fn test_small_stitch_distance_leaves_gap() {
    // The seam narrows towards the top; a 2mm limit only bridges upper layers
    let mesh = TriangleMesh::from_triangles(&open_cube())
        .with_settings(MeshSettings::new().extensive_stitching(2.0));
    let stack = slice(&mesh);
    assert!(stack[0].polygons.is_empty());
    assert_eq!(stack[98].polygons.len(), 1);
    assert_eq!(stack.stats.extensive_joins + stack.stats.open_chains_dropped, 99);
}

#[test]
fn test_duplicate_triangles() {
    let mut triangles = cube_triangles();
    triangles.extend(cube_triangles());
    let mesh = TriangleMesh::from_triangles(&triangles);
    assert_eq!(mesh.non_manifold_edge_count(), 18);

    let stack = slice(&mesh);
    assert_eq!(stack.len(), 99);
    for layer in &stack {
        assert_eq!(layer.polygons.len(), 2);
        assert_eq!(layer.polygons[0], layer.polygons[1]);
    }
    assert_eq!(stack.stats.open_chains_dropped, 0);
}

#[test]
fn test_degenerate_faces_are_skipped() {
    let p = Point3F::new;
    let mut triangles = cube_triangles();
    // collinear, away from the cube
    triangles.push([p(20.0, 20.0, 0.0), p(21.0, 21.0, 1.0), p(22.0, 22.0, 2.0)]);
    // repeated corner
    triangles.push([p(20.0, 0.0, 0.0), p(20.0, 0.0, 0.0), p(21.0, 0.0, 5.0)]);
    let mesh = TriangleMesh::from_triangles(&triangles);

    let stack = slice(&mesh);
    assert_eq!(stack.stats.degenerate_faces, 2);
    assert!(stack.iter().all(|l| l.polygons.len() == 1));
}

#[test]
fn test_isolated_triangle_is_dropped() {
    let p = Point3F::new;
    let mesh = TriangleMesh::from_triangles(&[[p(0.0, 0.0, 0.0), p(5.0, 0.0, 0.0), p(0.0, 0.0, 5.0)]]);
    let stack = Slicer::new(test_config())
        .slice(&mesh, &LayerPlan::uniform(0.2, 0.1, 10))
        .unwrap();
    assert_eq!(stack.len(), 10);
    assert!(stack.iter().all(|l| l.is_empty()));
    assert_eq!(stack.stats.open_chains_dropped, 10);
}
