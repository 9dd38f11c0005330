use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::geometry::{Point, distance};

use super::visibility::VisibilityGraph;

/// Ordered route from a requested start to a requested end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Path {
    points: Vec<Point>,
}

impl Path {
    /// Re-attaches the requested endpoints around the solver's intermediate
    /// vertices.
    pub fn through(start: Point, via: Vec<Point>, end: Point) -> Self {
        let mut points = Vec::with_capacity(via.len() + 2);
        points.push(start);
        points.extend(via);
        points.push(end);
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total Euclidean length of the polyline.
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| distance(w[0], w[1])).sum()
    }

    /// Prepends and appends extra points, e.g. connector anchors around
    /// port stubs.
    pub fn wrap(self, before: Point, after: Point) -> Self {
        Self::through(before, self.points, after)
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct QueueEntry {
    cost: f32,
    node: usize,
}

impl Eq for QueueEntry {}

// Min-heap on cost; equal costs pop the lowest node index first.
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra over the visibility graph extended with `start` and `end`.
///
/// Returns the intermediate graph vertices of the shortest route, without
/// the start and end points themselves; an empty list means the two points
/// see each other directly. `None` means no route exists.
///
/// Every hop must also stay out of the inflated boxes, so a route never cuts
/// through a node from one of its corners or from a port stub on its edge.
pub fn shortest_path(graph: &VisibilityGraph, start: Point, end: Point) -> Option<Vec<Point>> {
    let open = |a: Point, b: Point, owner: Option<usize>| {
        graph.is_visible(a, b, owner) && graph.stays_outside(a, b)
    };
    if open(start, end, None) {
        return Some(Vec::new());
    }

    let vertices = graph.vertices();
    let n = vertices.len();
    let start_idx = n;
    let end_idx = n + 1;

    let sees_end: Vec<bool> = vertices
        .iter()
        .map(|v| open(v.point, end, Some(v.owner)))
        .collect();

    let mut best = vec![f32::INFINITY; n + 2];
    let mut prev: Vec<Option<usize>> = vec![None; n + 2];
    let mut heap = BinaryHeap::new();

    best[start_idx] = 0.0;
    heap.push(QueueEntry {
        cost: 0.0,
        node: start_idx,
    });

    let point_of = |idx: usize| -> Point {
        match idx {
            i if i < n => vertices[i].point,
            i if i == start_idx => start,
            _ => end,
        }
    };

    while let Some(QueueEntry { cost, node }) = heap.pop() {
        if cost > best[node] {
            continue;
        }
        if node == end_idx {
            break;
        }

        let here = point_of(node);
        let mut relax = |next: usize, heap: &mut BinaryHeap<QueueEntry>| {
            let there = point_of(next);
            if next != end_idx && !graph.stays_outside(here, there) {
                return;
            }
            let next_cost = cost + distance(here, there);
            if next_cost < best[next] {
                best[next] = next_cost;
                prev[next] = Some(node);
                heap.push(QueueEntry {
                    cost: next_cost,
                    node: next,
                });
            }
        };

        if node == start_idx {
            for (idx, v) in vertices.iter().enumerate() {
                if graph.is_visible(start, v.point, None) {
                    relax(idx, &mut heap);
                }
            }
            continue;
        }

        for &next in graph.neighbors(node) {
            relax(next, &mut heap);
        }
        if sees_end[node] {
            relax(end_idx, &mut heap);
        }
    }

    if !best[end_idx].is_finite() {
        return None;
    }

    let mut via = Vec::new();
    let mut cursor = prev[end_idx];
    while let Some(idx) = cursor {
        if idx == start_idx {
            break;
        }
        via.push(vertices[idx].point);
        cursor = prev[idx];
    }
    via.reverse();
    Some(via)
}

/// Full route from `start` to `end`, or `None` when they are disconnected.
pub fn route(graph: &VisibilityGraph, start: Point, end: Point) -> Option<Path> {
    shortest_path(graph, start, end).map(|via| Path::through(start, via, end))
}
