//! Joining slice segments into closed loops.
//!
//! Segments live in an arena and are addressed by index. A first walk joins
//! each segment to the one whose start key equals its end key, falling back
//! to the nearest start within a small snap distance. The walk can leave
//! pieces of one loop as separate open chains (it starts from the lowest
//! unconsumed segment, not from the start of a path), so open chains are then
//! linked greedily tail to head. With extensive stitching enabled the same
//! linker runs once more with a much larger gap limit.

use super::segment::{EndpointKey, SlicerSegment};
use crate::config::MeshSettings;
use crate::geometry::{Point, Polygon, Polyline};
use crate::{scale, Coord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Largest gap (10 µm) closed by snapping without extensive stitching.
pub const SNAP_DISTANCE: Coord = 10_000;

/// Gap limits for the stitcher, in scaled units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchConfig {
    pub snap_distance: Coord,
    /// Limit for the extensive pass; `None` disables it.
    pub extensive_distance: Option<Coord>,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            snap_distance: SNAP_DISTANCE,
            extensive_distance: None,
        }
    }
}

impl StitchConfig {
    pub fn from_mesh_settings(settings: &MeshSettings) -> Self {
        Self {
            snap_distance: SNAP_DISTANCE,
            extensive_distance: settings
                .extensive_stitching
                .then(|| scale(settings.extensive_stitching_distance)),
        }
    }
}

/// Counters for one layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchReport {
    pub segments: usize,
    pub exact_joins: usize,
    pub snapped_joins: usize,
    pub merged_chains: usize,
    pub extensive_joins: usize,
    pub closed_loops: usize,
    pub open_chains: usize,
    pub degenerate_loops: usize,
}

#[derive(Debug, Default)]
pub struct StitchResult {
    pub polygons: Vec<Polygon>,
    pub open_chains: Vec<Polyline>,
    pub report: StitchReport,
}

/// An open path with the keys of its two ends. Keys are absent for ends
/// that were produced by a numeric join.
#[derive(Clone, Debug)]
pub struct OpenChain {
    pub points: Vec<Point>,
    pub head_key: Option<EndpointKey>,
    pub tail_key: Option<EndpointKey>,
}

impl OpenChain {
    fn head(&self) -> Point {
        self.points.first().copied().unwrap_or_default()
    }

    fn tail(&self) -> Point {
        self.points.last().copied().unwrap_or_default()
    }
}

/// Uniform grid over segment start points.
struct StartGrid {
    cell: Coord,
    cells: HashMap<(Coord, Coord), Vec<usize>>,
}

impl StartGrid {
    fn new(segments: &[SlicerSegment], cell: Coord) -> Self {
        let cell = cell.max(1);
        let mut cells: HashMap<(Coord, Coord), Vec<usize>> = HashMap::with_capacity(segments.len());
        for (i, s) in segments.iter().enumerate() {
            cells
                .entry((s.start.x.div_euclid(cell), s.start.y.div_euclid(cell)))
                .or_default()
                .push(i);
        }
        Self { cell, cells }
    }

    /// Indices of segments starting in the cells around `p`.
    fn near(&self, p: Point) -> impl Iterator<Item = usize> + '_ {
        let cx = p.x.div_euclid(self.cell);
        let cy = p.y.div_euclid(self.cell);
        (cx - 1..=cx + 1)
            .flat_map(move |x| (cy - 1..=cy + 1).map(move |y| (x, y)))
            .filter_map(move |key| self.cells.get(&key))
            .flatten()
            .copied()
    }
}

enum Step {
    Next(usize),
    Close,
    Stop,
}

struct Walker<'a> {
    segments: &'a [SlicerSegment],
    by_start: HashMap<EndpointKey, Vec<usize>>,
    grid: StartGrid,
    consumed: Vec<bool>,
    snap_sq: i128,
}

impl<'a> Walker<'a> {
    fn new(segments: &'a [SlicerSegment], snap_distance: Coord) -> Self {
        let mut by_start: HashMap<EndpointKey, Vec<usize>> = HashMap::with_capacity(segments.len());
        for (i, s) in segments.iter().enumerate() {
            by_start.entry(s.start_key).or_default().push(i);
        }
        Self {
            segments,
            by_start,
            grid: StartGrid::new(segments, snap_distance),
            consumed: vec![false; segments.len()],
            snap_sq: snap_distance as i128 * snap_distance as i128,
        }
    }

    fn exact_step(&self, origin: usize, current: usize) -> Option<Step> {
        let cur = &self.segments[current];
        if cur.end_key == self.segments[origin].start_key {
            return Some(Step::Close);
        }
        let candidates = self.by_start.get(&cur.end_key)?;
        let mut free = candidates.iter().copied().filter(|&i| !self.consumed[i]);
        let first = free.next()?;
        let preferred = std::iter::once(first)
            .chain(free)
            .find(|&i| Some(self.segments[i].face) == cur.end_neighbor);
        Some(Step::Next(preferred.unwrap_or(first)))
    }

    fn snap_step(&self, origin: usize, current: usize, chain_len: usize) -> Option<Step> {
        let end = self.segments[current].end;
        let mut best: Option<(i128, usize)> = None;
        for i in self.grid.near(end) {
            let closes = i == origin && chain_len > 1;
            if self.consumed[i] && !closes {
                continue;
            }
            let d = end.distance_squared(&self.segments[i].start);
            if d <= self.snap_sq && best.map_or(true, |b| (d, i) < b) {
                best = Some((d, i));
            }
        }
        best.map(|(_, i)| if i == origin { Step::Close } else { Step::Next(i) })
    }

    fn walk(&mut self, origin: usize, report: &mut StitchReport) -> (Vec<usize>, bool) {
        self.consumed[origin] = true;
        let mut chain = vec![origin];
        loop {
            let current = chain[chain.len() - 1];
            let step = match self.exact_step(origin, current) {
                Some(step) => {
                    report.exact_joins += 1;
                    step
                }
                None => match self.snap_step(origin, current, chain.len()) {
                    Some(step) => {
                        report.snapped_joins += 1;
                        step
                    }
                    None => Step::Stop,
                },
            };
            match step {
                Step::Next(i) => {
                    self.consumed[i] = true;
                    chain.push(i);
                }
                Step::Close => return (chain, true),
                Step::Stop => return (chain, false),
            }
        }
    }
}

/// Join one layer's segments into closed polygons and open chains.
pub fn stitch_segments(segments: &[SlicerSegment], config: &StitchConfig) -> StitchResult {
    let mut report = StitchReport {
        segments: segments.len(),
        ..Default::default()
    };
    let mut loops: Vec<Vec<Point>> = Vec::new();
    let mut open: Vec<OpenChain> = Vec::new();

    let mut walker = Walker::new(segments, config.snap_distance);
    for origin in 0..segments.len() {
        if walker.consumed[origin] {
            continue;
        }
        let (chain, closed) = walker.walk(origin, &mut report);
        let mut points: Vec<Point> = chain.iter().map(|&i| segments[i].start).collect();
        if closed {
            loops.push(points);
        } else {
            let last = &segments[chain[chain.len() - 1]];
            points.push(last.end);
            open.push(OpenChain {
                points,
                head_key: Some(segments[origin].start_key),
                tail_key: Some(last.end_key),
            });
        }
    }

    let linked = link_chains(open, config.snap_distance, true);
    report.merged_chains = linked.joins;
    loops.extend(linked.closed);
    let mut open = linked.open;

    if let Some(distance) = config.extensive_distance {
        if !open.is_empty() {
            let linked = link_chains(open, distance, false);
            report.extensive_joins = linked.joins;
            loops.extend(linked.closed);
            open = linked.open;
        }
    }

    let mut polygons = Vec::with_capacity(loops.len());
    for points in loops {
        if points.len() < 3 {
            report.degenerate_loops += 1;
        } else {
            polygons.push(Polygon::from_points(points));
        }
    }
    report.closed_loops = polygons.len();
    report.open_chains = open.len();

    StitchResult {
        polygons,
        open_chains: open.into_iter().map(|c| Polyline::from_points(c.points)).collect(),
        report,
    }
}

/// Output of [`link_chains`].
#[derive(Debug, Default)]
pub struct LinkedChains {
    /// Closed loops, without a repeated end point.
    pub closed: Vec<Vec<Point>>,
    pub open: Vec<OpenChain>,
    pub joins: usize,
}

fn append_skipping_joint(path: &mut Vec<Point>, points: &[Point]) {
    let skip = usize::from(!path.is_empty() && path.last() == points.first());
    path.extend_from_slice(&points[skip.min(points.len())..]);
}

/// Link open chains tail to head.
///
/// A tail and a head are candidates when their gap is at most `max_distance`
/// or, with `use_keys`, when they share an endpoint key. A chain may link to
/// its own head. Candidates are accepted shortest first (ties by tail then
/// head index) as long as the tail and head are both still free.
pub fn link_chains(chains: Vec<OpenChain>, max_distance: Coord, use_keys: bool) -> LinkedChains {
    let n = chains.len();
    if n == 0 {
        return LinkedChains::default();
    }
    let max_sq = max_distance as i128 * max_distance as i128;

    let mut candidates: Vec<(i128, usize, usize)> = Vec::new();
    for (i, from) in chains.iter().enumerate() {
        let tail = from.tail();
        for (j, to) in chains.iter().enumerate() {
            let keyed = use_keys && from.tail_key.is_some() && from.tail_key == to.head_key;
            let d = if keyed { 0 } else { tail.distance_squared(&to.head()) };
            if keyed || d <= max_sq {
                candidates.push((d, i, j));
            }
        }
    }
    candidates.sort_unstable();

    let mut next: Vec<Option<usize>> = vec![None; n];
    let mut has_prev = vec![false; n];
    let mut joins = 0;
    for (_, i, j) in candidates {
        if next[i].is_some() || has_prev[j] {
            continue;
        }
        next[i] = Some(j);
        has_prev[j] = true;
        joins += 1;
    }

    let mut visited = vec![false; n];
    let mut result = LinkedChains {
        joins,
        ..Default::default()
    };

    // Paths start at chains nothing links into
    for head in 0..n {
        if has_prev[head] {
            continue;
        }
        let mut points = Vec::new();
        let mut current = Some(head);
        let head_key = chains[head].head_key;
        let mut tail_key = None;
        while let Some(c) = current {
            visited[c] = true;
            tail_key = chains[c].tail_key;
            append_skipping_joint(&mut points, &chains[c].points);
            current = next[c];
        }
        result.open.push(OpenChain {
            points,
            head_key,
            tail_key,
        });
    }

    // Everything left is on a cycle; start each at its lowest index
    for start in 0..n {
        if visited[start] {
            continue;
        }
        let mut points = Vec::new();
        let mut current = start;
        loop {
            visited[current] = true;
            append_skipping_joint(&mut points, &chains[current].points);
            match next[current] {
                Some(c) if !visited[c] => current = c,
                _ => break,
            }
        }
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        result.closed.push(points);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriangleMesh;
    use crate::slice::segment::slice_face;

    fn seg(start: Point, end: Point, start_key: EndpointKey, end_key: EndpointKey, face: usize) -> SlicerSegment {
        SlicerSegment {
            start,
            end,
            start_key,
            end_key,
            face,
            end_neighbor: None,
        }
    }

    fn cube_segments(z: f64) -> Vec<SlicerSegment> {
        let mesh = TriangleMesh::cube(10.0);
        (0..mesh.face_count())
            .filter_map(|f| slice_face(&mesh, f, scale(z)))
            .collect()
    }

    #[test]
    fn test_cube_closes_by_keys() {
        let result = stitch_segments(&cube_segments(5.0), &StitchConfig::default());
        assert_eq!(result.polygons.len(), 1);
        assert!(result.open_chains.is_empty());
        assert!(result.polygons[0].is_counter_clockwise());
        assert_eq!(result.report.segments, 8);
        assert_eq!(result.report.snapped_joins, 0);
        assert_eq!(result.report.closed_loops, 1);
        assert!((result.polygons[0].area() - 100.0 * 1e12).abs() < 1.0);
    }

    #[test]
    fn test_loop_closes_from_any_start() {
        let k = |i| EndpointKey::Edge { lo: i, hi: i + 100 };
        let p = |x, y| Point::new(x, y);
        let segments = vec![
            seg(p(1000, 0), p(1000, 1000), k(1), k(2), 1),
            seg(p(1000, 1000), p(0, 1000), k(2), k(3), 2),
            seg(p(0, 0), p(1000, 0), k(0), k(1), 0),
            seg(p(0, 1000), p(0, 0), k(3), k(0), 3),
        ];
        let result = stitch_segments(&segments, &StitchConfig::default());
        assert_eq!(result.polygons.len(), 1);
        assert_eq!(result.polygons[0].len(), 4);
        assert_eq!(result.report.exact_joins, 4);
        assert_eq!(result.report.merged_chains, 0);
    }

    #[test]
    fn test_open_pieces_are_merged() {
        // The walk from segment 0 runs to the end of the path before the
        // piece leading into it is seen.
        let k = |i| EndpointKey::Edge { lo: i, hi: i + 100 };
        let p = |x: f64, y: f64| Point::new_scale(x, y);
        let segments = vec![
            seg(p(1.0, 0.0), p(2.0, 0.0), k(1), k(2), 1),
            seg(p(0.0, 0.0), p(1.0, 0.0), k(0), k(1), 0),
            seg(p(2.0, 0.0), p(2.0, 1.0), k(2), k(3), 2),
        ];
        let result = stitch_segments(&segments, &StitchConfig::default());
        assert!(result.polygons.is_empty());
        assert_eq!(result.open_chains.len(), 1);
        assert_eq!(result.open_chains[0].len(), 4);
        assert_eq!(result.open_chains[0].first(), Some(&p(0.0, 0.0)));
        assert_eq!(result.report.exact_joins, 1);
        assert_eq!(result.report.merged_chains, 1);
    }

    #[test]
    fn test_snap_join() {
        let p = |x, y| Point::new(x, y);
        let segments = vec![
            seg(p(0, 0), p(1_000_000, 0), EndpointKey::Vertex(0), EndpointKey::Vertex(1), 0),
            // starts 5 µm away from the previous end, under a different key
            seg(p(1_005_000, 0), p(1_000_000, 1_000_000), EndpointKey::Vertex(7), EndpointKey::Vertex(2), 1),
            seg(p(1_000_000, 1_000_000), p(0, 0), EndpointKey::Vertex(2), EndpointKey::Vertex(0), 2),
        ];
        let result = stitch_segments(&segments, &StitchConfig::default());
        assert_eq!(result.polygons.len(), 1);
        assert_eq!(result.report.snapped_joins, 1);
        assert_eq!(result.report.exact_joins, 2);
    }

    #[test]
    fn test_gap_needs_extensive_stitching() {
        let p = |x, y| Point::new(x, y);
        let segments = vec![
            seg(p(0, 0), p(5_000_000, 0), EndpointKey::Vertex(0), EndpointKey::Vertex(1), 0),
            seg(p(5_000_000, 0), p(5_000_000, 5_000_000), EndpointKey::Vertex(1), EndpointKey::Vertex(2), 1),
            seg(p(5_000_000, 5_000_000), p(0, 5_000_000), EndpointKey::Vertex(2), EndpointKey::Vertex(3), 2),
            // 1mm short of closing
            seg(p(0, 5_000_000), p(0, 1_000_000), EndpointKey::Vertex(3), EndpointKey::Vertex(4), 3),
        ];

        let plain = stitch_segments(&segments, &StitchConfig::default());
        assert!(plain.polygons.is_empty());
        assert_eq!(plain.open_chains.len(), 1);
        assert_eq!(plain.report.open_chains, 1);

        let config = StitchConfig {
            extensive_distance: Some(scale(2.0)),
            ..Default::default()
        };
        let stitched = stitch_segments(&segments, &config);
        assert_eq!(stitched.polygons.len(), 1);
        assert_eq!(stitched.polygons[0].len(), 5);
        assert_eq!(stitched.report.extensive_joins, 1);
        assert!(stitched.open_chains.is_empty());
    }

    #[test]
    fn test_link_chains_prefers_shortest_gap() {
        let p = |x, y| Point::new(x, y);
        let chain = |a: Point, b: Point| OpenChain {
            points: vec![a, b],
            head_key: None,
            tail_key: None,
        };
        let chains = vec![
            chain(p(0, 0), p(100, 0)),
            chain(p(130, 0), p(200, 0)),
            chain(p(110, 0), p(110, 80)),
        ];
        let linked = link_chains(chains, 50, false);
        // 0 -> 2 (gap 10) wins over 0 -> 1 (gap 30)
        assert_eq!(linked.joins, 1);
        assert!(linked.closed.is_empty());
        assert_eq!(linked.open.len(), 2);
        assert_eq!(linked.open[0].points, vec![p(0, 0), p(100, 0), p(110, 0), p(110, 80)]);
    }

    #[test]
    fn test_self_link_closes() {
        let p = |x, y| Point::new(x, y);
        let chains = vec![OpenChain {
            points: vec![p(0, 0), p(100, 0), p(100, 100), p(0, 5)],
            head_key: None,
            tail_key: None,
        }];
        let linked = link_chains(chains, 10, false);
        assert_eq!(linked.closed.len(), 1);
        assert_eq!(linked.closed[0].len(), 4);
        assert!(linked.open.is_empty());
    }

    #[test]
    fn test_degenerate_loop_dropped() {
        let p = |x, y| Point::new(x, y);
        let segments = vec![
            seg(p(0, 0), p(100, 0), EndpointKey::Vertex(0), EndpointKey::Vertex(1), 0),
            seg(p(100, 0), p(0, 0), EndpointKey::Vertex(1), EndpointKey::Vertex(0), 1),
        ];
        let result = stitch_segments(&segments, &StitchConfig::default());
        assert!(result.polygons.is_empty());
        assert_eq!(result.report.degenerate_loops, 1);
    }

    #[test]
    fn test_stitch_config_from_mesh_settings() {
        let config = StitchConfig::from_mesh_settings(&MeshSettings::new());
        assert_eq!(config.extensive_distance, None);
        let config = StitchConfig::from_mesh_settings(&MeshSettings::new().extensive_stitching(2.5));
        assert_eq!(config.extensive_distance, Some(2_500_000));
    }
}
