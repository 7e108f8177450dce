//! Property-based tests for layer cleanup.
//!
//! Run with: cargo test -p contour-slicer --test properties

use contour_slicer::geometry::{simplify_polygon, SimplifyConfig};
use contour_slicer::slice::post_process::LayerProcessor;
use contour_slicer::slice::stitcher::StitchResult;
use contour_slicer::{LayerBand, LayerPlan, MeshSettings, Point, Point3F, Polygon, SliceConfig, Slicer, TriangleMesh};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Star-shaped polygon: one radius per evenly spaced angle, CCW.
fn arb_star_polygon() -> impl Strategy<Value = Polygon> {
    prop::collection::vec(1.0..20.0f64, 3..80).prop_map(|radii| {
        let n = radii.len();
        Polygon::from_points(
            radii
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    let a = i as f64 / n as f64 * std::f64::consts::TAU;
                    Point::new_scale(r * a.cos(), r * a.sin())
                })
                .collect(),
        )
    })
}

/// Axis-aligned rectangle given by corner and size (mm).
fn arb_rectangle() -> impl Strategy<Value = Polygon> {
    (-50.0..50.0f64, -50.0..50.0f64, 0.05..5.0f64, 0.05..5.0f64).prop_map(|(x, y, w, h)| {
        Polygon::rectangle(Point::new_scale(x, y), Point::new_scale(x + w, y + h))
    })
}

fn arb_simplify_config() -> impl Strategy<Value = SimplifyConfig> {
    (0.01..1.0f64, 0.005..0.1f64, 0.001..5.0f64)
        .prop_map(|(resolution, deviation, area)| SimplifyConfig::new(resolution, deviation, area))
}

fn band() -> LayerBand {
    LayerBand {
        index: 1,
        bottom_z: 200_000,
        top_z: 300_000,
        slice_z: 250_000,
    }
}

fn kept_polygons(polygons: &[Polygon], min_circumference: f64) -> usize {
    let config = SliceConfig::default().minimum_polygon_circumference(min_circumference);
    let processor = LayerProcessor::new(&config, &MeshSettings::default());
    let stitched = StitchResult {
        polygons: polygons.to_vec(),
        ..Default::default()
    };
    processor.process(&band(), stitched).0.polygons.len()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_simplify_is_idempotent(polygon in arb_star_polygon(), config in arb_simplify_config()) {
        let once = simplify_polygon(&polygon, &config);
        let twice = simplify_polygon(&once, &config);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn proptest_simplify_never_grows(polygon in arb_star_polygon(), config in arb_simplify_config()) {
        let simplified = simplify_polygon(&polygon, &config);
        prop_assert!(simplified.len() <= polygon.len());
        prop_assert!(simplified.len() >= 3);
    }

    #[test]
    fn proptest_min_circumference_is_monotonic(
        polygons in prop::collection::vec(arb_rectangle(), 0..20),
        a in 0.0..25.0f64,
        b in 0.0..25.0f64,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(kept_polygons(&polygons, low) >= kept_polygons(&polygons, high));
        prop_assert!(kept_polygons(&polygons, 0.0) == polygons.len());
    }

    #[test]
    fn proptest_layer_count_matches_plan(
        height in 0.5..5.0f64,
        first in 0.1..0.4f64,
        layer in 0.05..0.3f64,
    ) {
        let mesh = TriangleMesh::cuboid(Point3F::new(0.0, 0.0, 0.0), Point3F::new(3.0, 3.0, height));
        let plan = LayerPlan::uniform_for_height(first, layer, height);
        let config = SliceConfig::default().first_layer_height(first).layer_height(layer);
        let stack = Slicer::new(config).slice(&mesh, &plan).unwrap();
        prop_assert_eq!(stack.len(), plan.layer_count());
        prop_assert!(stack.iter().enumerate().all(|(i, l)| l.index == i));
    }
}
