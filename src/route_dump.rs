use crate::routing::{Curve, RoutingFrame};
use crate::scene::{ConnectorId, RoleClass, Scene};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDump {
    pub clearance_margin: f32,
    pub graph_vertices: usize,
    pub graph_edges: usize,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDump {
    pub id: usize,
    pub from: String,
    pub to: String,
    pub class: RoleClass,
    pub routed: bool,
    /// Drawing points; a direct curve's control point sits in the middle.
    pub points: Vec<[f32; 2]>,
}

impl RouteDump {
    pub fn from_frame(scene: &Scene, frame: &RoutingFrame) -> Self {
        let nodes = frame
            .obstacles
            .iter()
            .filter_map(|(id, obstacle)| {
                let node = scene.node(*id)?;
                Some(NodeDump {
                    id: node.key.clone(),
                    x: obstacle.x,
                    y: obstacle.y,
                    width: obstacle.width,
                    height: obstacle.height,
                })
            })
            .collect();

        let key_of = |id: ConnectorId| {
            scene
                .connector(id)
                .map(|c| c.key.clone())
                .unwrap_or_default()
        };
        let links = frame
            .links
            .iter()
            .filter_map(|routed| {
                let (from, to) = scene.link(routed.link)?.endpoints()?;
                Some(LinkDump {
                    id: routed.link.0,
                    from: key_of(from),
                    to: key_of(to),
                    class: routed.class,
                    routed: matches!(routed.curve, Some(Curve::Routed { .. })),
                    points: routed
                        .curve
                        .as_ref()
                        .map(|curve| curve.points().iter().map(|p| [p.x, p.y]).collect())
                        .unwrap_or_default(),
                })
            })
            .collect();

        RouteDump {
            clearance_margin: frame.graph.margin(),
            graph_vertices: frame.graph.vertices().len(),
            graph_edges: frame.graph.edge_count(),
            nodes,
            links,
        }
    }
}

pub fn write_route_dump(output: Option<&Path>, scene: &Scene, frame: &RoutingFrame) -> anyhow::Result<()> {
    let dump = RouteDump::from_frame(scene, frame);
    match output {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writer.flush()?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}
