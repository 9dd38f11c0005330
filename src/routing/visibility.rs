use serde::Serialize;

use crate::geometry::Point;

use super::obstacle::Obstacle;

/// A corner of an inflated obstacle, tagged with the index of the obstacle
/// it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vertex {
    pub point: Point,
    pub owner: usize,
}

/// Sightlines between inflated obstacle corners.
///
/// The graph is rebuilt from scratch whenever an obstacle moves or is
/// resized; it is never patched in place. Vertices keep insertion order
/// (obstacle order, then top-left, top-right, bottom-right, bottom-left),
/// which is also the tie-breaking order of the shortest-path search.
#[derive(Debug, Clone)]
pub struct VisibilityGraph {
    obstacles: Vec<Obstacle>,
    margin: f32,
    exclude_owner: bool,
    vertices: Vec<Vertex>,
    edges: Vec<Vec<usize>>,
}

impl VisibilityGraph {
    pub fn build(obstacles: &[Obstacle], margin: f32, exclude_owner: bool) -> Self {
        let mut vertices: Vec<Vertex> = Vec::with_capacity(obstacles.len() * 4);
        for (owner, obstacle) in obstacles.iter().enumerate() {
            for point in obstacle.inflated_corners(margin) {
                // Coincident corners collapse into one vertex; the first owner wins.
                if vertices.iter().any(|v| v.point.same_coords(&point)) {
                    continue;
                }
                vertices.push(Vertex { point, owner });
            }
        }

        let mut graph = Self {
            obstacles: obstacles.to_vec(),
            margin,
            exclude_owner,
            vertices,
            edges: Vec::new(),
        };

        let mut edges = Vec::with_capacity(graph.vertices.len());
        for v in &graph.vertices {
            let visible: Vec<usize> = graph
                .vertices
                .iter()
                .enumerate()
                .filter(|(_, w)| !w.point.same_coords(&v.point))
                .filter(|(_, w)| graph.is_visible(v.point, w.point, Some(v.owner)))
                .map(|(idx, _)| idx)
                .collect();
            edges.push(visible);
        }
        graph.edges = edges;

        tracing::debug!(
            obstacles = graph.obstacles.len(),
            vertices = graph.vertices.len(),
            edges = graph.edge_count(),
            "rebuilt visibility graph"
        );
        graph
    }

    /// True when no obstacle blocks the segment. `owner` names the obstacle
    /// the segment starts from; it is skipped only when the graph was built
    /// with owner exclusion enabled.
    pub fn is_visible(&self, from: Point, to: Point, owner: Option<usize>) -> bool {
        self.obstacles.iter().enumerate().all(|(idx, obstacle)| {
            if self.exclude_owner && owner == Some(idx) {
                return true;
            }
            !obstacle.blocks_segment(self.margin, from, to)
        })
    }

    /// True when the segment keeps out of every inflated box interior.
    /// Graph edges may still cut across their own obstacle corner to corner;
    /// routes only take hops that pass this test.
    pub fn stays_outside(&self, from: Point, to: Point) -> bool {
        !self
            .obstacles
            .iter()
            .any(|obstacle| obstacle.passes_through(self.margin, from, to))
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        self.edges.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Outgoing sightlines of the vertex at `point`, if it is a graph vertex.
    pub fn visible_from(&self, point: Point) -> Option<Vec<Point>> {
        let idx = self
            .vertices
            .iter()
            .position(|v| v.point.same_coords(&point))?;
        Some(
            self.edges[idx]
                .iter()
                .map(|&w| self.vertices[w].point)
                .collect(),
        )
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// Every directed sightline as a (from, to) pair of points.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.edges.iter().enumerate().flat_map(move |(v, targets)| {
            targets
                .iter()
                .map(move |&w| (self.vertices[v].point, self.vertices[w].point))
        })
    }
}
