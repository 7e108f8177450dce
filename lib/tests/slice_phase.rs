//! End-to-end slicing of simple solids.
//!
//! Settings follow a typical fine print profile: 0.2mm first layer, 0.1mm
//! layers, 40µm resolution, 20µm deviation.

use contour_slicer::clipper::relative_hamming_distance;
use contour_slicer::{
    AdaptiveLayer, LayerPlan, Point, Point3F, Polygon, Settings, SliceConfig, Slicer,
    SlicingTolerance, TriangleMesh,
};

fn test_config() -> SliceConfig {
    SliceConfig::new()
        .first_layer_height(0.2)
        .layer_height(0.1)
        .slicing_tolerance(SlicingTolerance::Middle)
        .minimum_polygon_circumference(1.0)
        .resolution(0.04, 0.02, 0.002)
}

/// Whether `polygon` visits exactly `expected`, starting anywhere.
fn is_cyclic_rotation(polygon: &Polygon, expected: &[Point]) -> bool {
    let points = polygon.points();
    if points.len() != expected.len() {
        return false;
    }
    let Some(offset) = expected.iter().position(|p| *p == points[0]) else {
        return false;
    };
    points
        .iter()
        .enumerate()
        .all(|(i, p)| *p == expected[(offset + i) % expected.len()])
}

#[test]
fn test_cube() {
    let mesh = TriangleMesh::cube(10.0);
    let slicer = Slicer::new(test_config());
    let plan = LayerPlan::uniform_for_height(0.2, 0.1, 10.0);
    assert_eq!(plan.layer_count(), 99);

    let stack = slicer.slice(&mesh, &plan).unwrap();
    assert_eq!(stack.len(), 99);

    let square = [
        Point::new_scale(0.0, 0.0),
        Point::new_scale(10.0, 0.0),
        Point::new_scale(10.0, 10.0),
        Point::new_scale(0.0, 10.0),
    ];
    for (i, layer) in stack.iter().enumerate() {
        assert_eq!(layer.index, i);
        assert_eq!(layer.polygons.len(), 1, "layer {}", i);
        assert!(
            is_cyclic_rotation(&layer.polygons[0], &square),
            "layer {}: {:?}",
            i,
            layer.polygons[0]
        );
    }
}

#[test]
fn test_cylinder() {
    const SEGMENTS: usize = 1000;
    let mesh = TriangleMesh::cylinder(10.0, 10.0, SEGMENTS);
    let slicer = Slicer::new(test_config());
    let plan = LayerPlan::uniform_for_height(0.2, 0.1, 10.0);
    let stack = slicer.slice(&mesh, &plan).unwrap();
    assert_eq!(stack.len(), 99);

    let ideal = Polygon::from_points(
        (0..SEGMENTS)
            .map(|i| {
                let a = i as f64 / SEGMENTS as f64 * std::f64::consts::TAU;
                Point::new_scale(10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect(),
    );
    let ideal = [ideal];

    for layer in &stack {
        assert_eq!(layer.polygons.len(), 1, "layer {}", layer.index);
        assert!(layer.polygons[0].is_counter_clockwise());
        let distance = relative_hamming_distance(&layer.polygons, &ideal);
        assert!(distance <= 0.002, "layer {}: distance {}", layer.index, distance);
    }
}

#[test]
fn test_layer_count_matches_plan() {
    let mesh = TriangleMesh::cuboid(Point3F::new(0.0, 0.0, 0.0), Point3F::new(4.0, 4.0, 3.0));
    let slicer = Slicer::new(test_config());

    // Uniform plan taller than the part: the extra layers are empty
    let uniform = LayerPlan::uniform(0.2, 0.1, 40);
    let stack = slicer.slice(&mesh, &uniform).unwrap();
    assert_eq!(stack.len(), 40);
    assert!(stack.iter().enumerate().all(|(i, l)| l.index == i));
    assert!(stack[38].polygons.is_empty());
    assert_eq!(stack[27].polygons.len(), 1);

    let adaptive = LayerPlan::Adaptive(vec![
        AdaptiveLayer::new(0.3, 0.3),
        AdaptiveLayer::new(0.4, 0.1),
        AdaptiveLayer::new(0.6, 0.2),
        AdaptiveLayer::new(0.7, 0.1),
        AdaptiveLayer::new(1.0, 0.3),
    ]);
    let stack = slicer.slice(&mesh, &adaptive).unwrap();
    assert_eq!(stack.len(), adaptive.layer_count());
    assert!(stack.iter().all(|l| l.polygons.len() == 1));
    let thickness: Vec<f64> = stack.iter().map(|l| l.thickness_mm()).collect();
    for (got, want) in thickness.iter().zip([0.3, 0.1, 0.2, 0.1, 0.3]) {
        assert!((got - want).abs() < 1e-9);
    }
    let z: Vec<i64> = stack.iter().map(|l| l.slice_z).collect();
    assert!(z.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_vertex_on_plane() {
    let mesh = TriangleMesh::cube(10.0);
    let plan = LayerPlan::uniform(0.2, 0.1, 99);

    // The last layer's top is the cube's top face
    let upper = Slicer::new(test_config().slicing_tolerance(SlicingTolerance::Upper))
        .slice(&mesh, &plan)
        .unwrap();
    assert_eq!(upper[98].slice_z, 10_000_000);
    assert_eq!(upper[98].polygons.len(), 1);
    assert!((upper[98].area() - 100.0).abs() < 1e-9);

    // The first layer's bottom is the cube's bottom face; the plane sits
    // just inside the solid so the first layer is not lost
    let lower = Slicer::new(test_config().slicing_tolerance(SlicingTolerance::Lower))
        .slice(&mesh, &plan)
        .unwrap();
    assert_eq!(lower[0].slice_z, 1);
    assert!(lower.iter().all(|l| l.polygons.len() == 1));
    assert!((lower[0].area() - 100.0).abs() < 1e-9);
}

#[test]
fn test_raft_overlap_shifts_layers() {
    let mesh = TriangleMesh::cube(10.0);
    let plan = LayerPlan::uniform(0.2, 0.1, 99);
    let stack = Slicer::new(test_config().raft(0.1)).slice(&mesh, &plan).unwrap();

    assert_eq!(stack.len(), 99);
    assert!((stack[0].thickness_mm() - 0.3).abs() < 1e-9);
    // Everything above the first layer moved up; the last plane clears the top
    assert!((stack[98].slice_z_mm() - 10.05).abs() < 1e-9);
    assert!(stack[98].polygons.is_empty());
    assert_eq!(stack[97].polygons.len(), 1);
}

#[test]
fn test_offsets_from_settings() {
    let settings = Settings::from_json(
        r#"{
            "layer_height_0": 0.2,
            "layer_height": 0.1,
            "meshfix_maximum_resolution": 0.04,
            "meshfix_maximum_deviation": 0.02,
            "meshfix_maximum_extrusion_area_deviation": 0.002,
            "xy_offset": -0.5,
            "xy_offset_layer_0": -1.0
        }"#,
    )
    .unwrap();
    let slicer = Slicer::from_settings(&settings).unwrap();
    let mesh = TriangleMesh::cube(10.0);
    let stack = slicer.slice(&mesh, &slicer.plan_for(&mesh)).unwrap();

    assert_eq!(stack.len(), 99);
    assert!((stack[0].area() - 64.0).abs() < 0.01);
    assert!((stack[50].area() - 81.0).abs() < 0.01);
}

#[test]
fn test_hollow_box_has_hole() {
    // Outer box with an inner box wound inside out: a closed shell with a cavity
    let outer = TriangleMesh::cube(10.0);
    let inner = TriangleMesh::cuboid(Point3F::new(3.0, 3.0, 3.0), Point3F::new(7.0, 7.0, 7.0));

    let mut triangles = Vec::new();
    for mesh in [&outer, &inner] {
        let flip = std::ptr::eq(mesh, &inner);
        for f in 0..mesh.face_count() {
            let [a, b, c] = mesh.face_positions(f).map(|p| p.to_f64());
            triangles.push(if flip { [a, c, b] } else { [a, b, c] });
        }
    }
    let shell = TriangleMesh::from_triangles(&triangles);
    assert!(shell.is_closed());

    let stack = Slicer::new(test_config())
        .slice(&shell, &LayerPlan::uniform(0.2, 0.1, 99))
        .unwrap();
    let middle = &stack[48];
    assert_eq!(middle.polygons.len(), 2);
    assert_eq!(middle.polygons.iter().filter(|p| p.is_hole()).count(), 1);
    assert!((middle.area() - 84.0).abs() < 1e-9);

    assert_eq!(stack[10].polygons.len(), 1);
}
