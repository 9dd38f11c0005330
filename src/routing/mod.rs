pub mod obstacle;
pub mod shortest_path;
pub mod visibility;

pub use obstacle::Obstacle;
pub use shortest_path::{Path, route, shortest_path};
pub use visibility::{Vertex, VisibilityGraph};

use serde::Serialize;

use crate::config::RoutingConfig;
use crate::geometry::Point;
use crate::scene::{ConnectorId, ConnectorRole, LinkId, NodeId, RoleClass, Scene};

/// Geometry handed to the renderer for one link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Curve {
    /// Obstacle-avoiding polyline from anchor to anchor.
    Routed { path: Path },
    /// Straight or quadratic curve that ignores obstacles.
    Direct {
        start: Point,
        control: Option<Point>,
        end: Point,
    },
}

impl Curve {
    /// Points of the curve in drawing order, control point included.
    pub fn points(&self) -> Vec<Point> {
        match self {
            Curve::Routed { path } => path.points().to_vec(),
            Curve::Direct {
                start,
                control,
                end,
            } => std::iter::once(*start)
                .chain(*control)
                .chain(std::iter::once(*end))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedLink {
    pub link: LinkId,
    pub class: RoleClass,
    /// `None` when no obstacle-free route exists; nothing is drawn.
    pub curve: Option<Curve>,
}

/// Result of one routing pass over the whole scene.
#[derive(Debug, Clone)]
pub struct RoutingFrame {
    pub graph: VisibilityGraph,
    pub obstacles: Vec<(NodeId, Obstacle)>,
    pub links: Vec<RoutedLink>,
}

impl RoutingFrame {
    pub fn link(&self, id: LinkId) -> Option<&RoutedLink> {
        self.links.iter().find(|routed| routed.link == id)
    }
}

/// Rebuilds the visibility graph over every node and routes every bound
/// link. Data links avoid obstacles; flow links are drawn directly.
pub fn route_scene(scene: &Scene, config: &RoutingConfig) -> RoutingFrame {
    let graph = build_graph(scene, config);
    let links = scene
        .links()
        .filter_map(|(id, _)| route_link(scene, &graph, config, id))
        .collect();
    RoutingFrame {
        graph,
        obstacles: scene.obstacles(),
        links,
    }
}

pub fn build_graph(scene: &Scene, config: &RoutingConfig) -> VisibilityGraph {
    let obstacles: Vec<Obstacle> = scene
        .obstacles()
        .into_iter()
        .map(|(_, obstacle)| obstacle)
        .collect();
    VisibilityGraph::build(
        &obstacles,
        config.clearance_margin,
        config.exclude_owner_obstacle,
    )
}

/// Routes a single bound link against an already built graph.
pub fn route_link(
    scene: &Scene,
    graph: &VisibilityGraph,
    config: &RoutingConfig,
    id: LinkId,
) -> Option<RoutedLink> {
    let (from, to) = scene.link(id)?.endpoints()?;
    let class = scene.connector(from)?.role.class();
    let input_anchor = scene.anchor(from)?;
    let output_anchor = scene.anchor(to)?;

    let curve = match class {
        RoleClass::Flow => Some(direct_curve(
            output_anchor,
            input_anchor,
            config.flow_curve_bend,
        )),
        RoleClass::Data => {
            let exit = port_stub(scene, to, config.clearance_margin)?;
            let entry = port_stub(scene, from, config.clearance_margin)?;
            let routed = route(graph, exit, entry).map(|path| Curve::Routed {
                path: path.wrap(output_anchor, input_anchor),
            });
            if routed.is_none() {
                tracing::debug!(link = id.0, "no obstacle-free route");
            }
            routed
        }
    };
    Some(RoutedLink {
        link: id,
        class,
        curve,
    })
}

/// Point where a data route leaves its node: level with the anchor, on the
/// inflated boundary (right side for outputs, left side for inputs).
pub fn port_stub(scene: &Scene, connector: ConnectorId, margin: f32) -> Option<Point> {
    let role = scene.connector(connector)?.role;
    let node = scene.node(scene.connector(connector)?.node)?;
    let anchor = scene.anchor(connector)?;
    let [top_left, top_right, _, _] = node.obstacle().inflated_corners(margin);
    let x = match role {
        ConnectorRole::DataOutput | ConnectorRole::FlowOut => top_right.x,
        ConnectorRole::DataInput | ConnectorRole::FlowIn => top_left.x,
    };
    Some(Point::new(x, anchor.y))
}

/// Direct curve between two anchors. A non-zero `bend` adds a quadratic
/// control point offset perpendicular to the chord.
pub fn direct_curve(start: Point, end: Point, bend: f32) -> Curve {
    let control = (bend != 0.0).then(|| {
        let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return mid;
        }
        Point::new(mid.x - dy / len * bend, mid.y + dx / len * bend)
    });
    Curve::Direct {
        start,
        control,
        end,
    }
}
