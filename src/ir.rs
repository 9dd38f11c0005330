//! Input description of a scene: node templates and the connector pairs to
//! wire between them. Positions are optional; unplaced nodes are laid out
//! automatically.

use serde::Deserialize;

use crate::geometry::Point;

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorSpec {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub module: String,
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ConnectorSpec>,
    #[serde(default)]
    pub outputs: Vec<ConnectorSpec>,
    #[serde(default)]
    pub position: Option<Point>,
}

/// Two connector keys clicked one after the other.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSpec {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneSpec {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub connections: Vec<ConnectionSpec>,
}

pub fn parse_scene(input: &str) -> anyhow::Result<SceneSpec> {
    let spec: SceneSpec = serde_json::from_str(input)?;
    Ok(spec)
}
