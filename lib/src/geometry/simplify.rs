//! Path simplification.
//!
//! Reduces the vertex count of slice contours while bounding the geometric
//! error. Vertices are visited in order of importance (their distance from
//! the line through their neighbours), least important first:
//!
//! - A vertex closer than [`MINIMUM_SEGMENT_LENGTH`] to that line is always
//!   removed.
//! - A vertex whose removal would cut away more than the maximum area
//!   deviation is always kept.
//! - A vertex between two edges longer than the maximum resolution is kept.
//! - Otherwise it is removed if it deviates less than the maximum deviation.
//!   When only one adjacent edge is short, that edge is replaced by the
//!   intersection of its neighbouring edges.
//!
//! Passes repeat until nothing changes, so simplifying an already simplified
//! path is a no-op.

use super::{Line, Point, Polygon, Polyline};
use crate::{scale, CoordF, SCALING_FACTOR};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Default maximum resolution for mesh fixing (0.5mm).
/// Segments shorter than this can be removed if within deviation tolerance.
pub const MESHFIX_MAXIMUM_RESOLUTION: CoordF = 0.5;

/// Default maximum deviation for mesh fixing (0.025mm = 25 microns).
/// Points can be removed if the resulting path deviates by less than this.
pub const MESHFIX_MAXIMUM_DEVIATION: CoordF = 0.025;

/// Default maximum area deviation per removed vertex (2.0 mm²).
pub const MESHFIX_MAXIMUM_EXTRUSION_AREA_DEVIATION: CoordF = 2.0;

/// Deviation below which a vertex is always removable (5 microns).
pub const MINIMUM_SEGMENT_LENGTH: CoordF = 0.005;

/// Configuration for path simplification. All values in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplifyConfig {
    /// Maximum resolution: segments shorter than this may be removed.
    pub max_resolution: CoordF,

    /// Maximum deviation: points can be removed if path deviates by less than this.
    pub max_deviation: CoordF,

    /// Maximum area (mm²) removed or added by dropping one vertex.
    pub max_area_deviation: CoordF,

    /// Deviation below which removal is unconditional.
    pub min_segment_length: CoordF,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            max_resolution: MESHFIX_MAXIMUM_RESOLUTION,
            max_deviation: MESHFIX_MAXIMUM_DEVIATION,
            max_area_deviation: MESHFIX_MAXIMUM_EXTRUSION_AREA_DEVIATION,
            min_segment_length: MINIMUM_SEGMENT_LENGTH,
        }
    }
}

impl SimplifyConfig {
    /// Create a new configuration with the specified tolerances.
    pub fn new(max_resolution: CoordF, max_deviation: CoordF, max_area_deviation: CoordF) -> Self {
        Self {
            max_resolution,
            max_deviation,
            max_area_deviation,
            ..Default::default()
        }
    }
}

/// Tolerances converted to squared scaled units.
struct Thresholds {
    max_resolution2: i128,
    max_deviation2: i128,
    /// Twice the allowed area, to compare against a raw cross product.
    max_area_2x: i128,
    min_resolution2: i128,
}

impl Thresholds {
    fn new(config: &SimplifyConfig) -> Self {
        let sq = |v: CoordF| {
            let s = scale(v.max(0.0)) as i128;
            s * s
        };
        Self {
            max_resolution2: sq(config.max_resolution),
            max_deviation2: sq(config.max_deviation),
            max_area_2x: (config.max_area_deviation.max(0.0) * SCALING_FACTOR * SCALING_FACTOR * 2.0)
                as i128,
            min_resolution2: sq(config.min_segment_length),
        }
    }
}

/// Working state of one simplification run.
struct Simplifier<'a> {
    points: Vec<Point>,
    deleted: Vec<bool>,
    closed: bool,
    limits: &'a Thresholds,
}

impl Simplifier<'_> {
    fn prev(&self, mut index: usize) -> usize {
        let n = self.points.len();
        loop {
            index = (index + n - 1) % n;
            if !self.deleted[index] {
                return index;
            }
        }
    }

    fn next(&self, mut index: usize) -> usize {
        let n = self.points.len();
        loop {
            index = (index + 1) % n;
            if !self.deleted[index] {
                return index;
            }
        }
    }

    fn is_endpoint(&self, index: usize) -> bool {
        !self.closed && (index == 0 || index == self.points.len() - 1)
    }

    fn importance(&self, index: usize) -> i128 {
        if self.is_endpoint(index) {
            return i128::MAX;
        }
        let before = self.points[self.prev(index)];
        let vertex = self.points[index];
        let after = self.points[self.next(index)];

        let area_2x = (vertex - before).cross(&(after - before)).abs();
        if area_2x > self.limits.max_area_2x {
            return i128::MAX;
        }

        let deviation2 = Line::distance_to_infinite_squared(vertex, before, after);
        if deviation2 <= self.limits.min_resolution2 {
            return deviation2;
        }
        if before.distance_squared(&vertex) > self.limits.max_resolution2
            && after.distance_squared(&vertex) > self.limits.max_resolution2
        {
            return i128::MAX;
        }
        deviation2
    }

    /// Try to drop `index`. Returns true when the path changed.
    fn remove(&mut self, index: usize, deviation2: i128) -> bool {
        if deviation2 <= self.limits.min_resolution2 {
            self.deleted[index] = true;
            return true;
        }

        let before = self.prev(index);
        let after = self.next(index);
        let vertex_pos = self.points[index];
        let length2_before = vertex_pos.distance_squared(&self.points[before]);
        let length2_after = vertex_pos.distance_squared(&self.points[after]);

        if length2_before <= self.limits.max_resolution2 && length2_after <= self.limits.max_resolution2 {
            self.deleted[index] = true;
            return true;
        }

        // One edge is long and the other short: move the short edge's far
        // vertex to where the surrounding edges meet.
        let before_is_short = length2_before <= length2_after;
        let (edge_in, edge_out, moved) = if before_is_short {
            if self.is_endpoint(before) {
                return false;
            }
            let before_before = self.prev(before);
            (
                Line::new(self.points[before_before], self.points[before]),
                Line::new(vertex_pos, self.points[after]),
                before,
            )
        } else {
            if self.is_endpoint(after) {
                return false;
            }
            let after_after = self.next(after);
            (
                Line::new(self.points[before], vertex_pos),
                Line::new(self.points[after], self.points[after_after]),
                after,
            )
        };

        let Some(intersection) = edge_in.intersection_infinite(&edge_out) else {
            return false;
        };
        if Line::distance_to_squared(intersection, edge_in.b, edge_out.a) > self.limits.max_deviation2 {
            return false;
        }
        self.deleted[index] = true;
        self.points[moved] = intersection;
        true
    }

    fn run(mut self) -> Vec<Point> {
        let min_size = if self.closed { 3 } else { 2 };
        let mut heap: BinaryHeap<Reverse<(i128, usize)>> = BinaryHeap::new();

        loop {
            let mut removed = 0usize;
            heap.clear();
            for i in 0..self.points.len() {
                if !self.deleted[i] {
                    heap.push(Reverse((self.importance(i), i)));
                }
            }

            while heap.len() > min_size {
                let Some(Reverse((stored, index))) = heap.pop() else {
                    break;
                };
                // Neighbours may have changed since this entry was queued.
                let current = self.importance(index);
                if current != stored {
                    heap.push(Reverse((current, index)));
                    continue;
                }
                if current <= self.limits.max_deviation2 && self.remove(index, current) {
                    removed += 1;
                }
            }

            if removed == 0 {
                break;
            }
        }

        self.points
            .into_iter()
            .zip(self.deleted)
            .filter_map(|(p, deleted)| (!deleted).then_some(p))
            .collect()
    }
}

fn simplify_points(points: &[Point], closed: bool, config: &SimplifyConfig) -> Vec<Point> {
    let min_size = if closed { 3 } else { 2 };
    if points.len() <= min_size {
        return points.to_vec();
    }
    let limits = Thresholds::new(config);
    Simplifier {
        points: points.to_vec(),
        deleted: vec![false; points.len()],
        closed,
        limits: &limits,
    }
    .run()
}

/// Simplify a closed polygon. Every vertex, including the first, may go.
pub fn simplify_polygon(polygon: &Polygon, config: &SimplifyConfig) -> Polygon {
    Polygon::from_points(simplify_points(polygon.points(), true, config))
}

/// Simplify an open polyline. The end points are kept.
pub fn simplify_polyline(polyline: &Polyline, config: &SimplifyConfig) -> Polyline {
    Polyline::from_points(simplify_points(polyline.points(), false, config))
}

/// A vertex is degenerate when the path doubles back on itself there, or
/// when it coincides with a neighbour.
fn is_spike(last: Point, now: Point, next: Point) -> bool {
    let incoming = now - last;
    let outgoing = next - now;
    incoming.cross(&outgoing) == 0 && incoming.dot(&outgoing) <= 0
}

/// Remove zero-length edges and 180° spikes until none remain.
///
/// Open paths keep their end points.
pub fn remove_degenerate_vertices(points: &mut Vec<Point>, closed: bool) {
    loop {
        let n = points.len();
        if n < 3 {
            return;
        }
        let mut kept: Vec<Point> = Vec::with_capacity(n);
        let mut changed = false;
        for i in 0..n {
            let now = points[i];
            if !closed && (i == 0 || i == n - 1) {
                kept.push(now);
                continue;
            }
            let last = kept.last().copied().unwrap_or(points[n - 1]);
            let next = if i + 1 == n {
                kept.first().copied().unwrap_or(points[0])
            } else {
                points[i + 1]
            };
            if is_spike(last, now, next) {
                changed = true;
            } else {
                kept.push(now);
            }
        }
        *points = kept;
        if !changed {
            return;
        }
    }
}
