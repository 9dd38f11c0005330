use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::NodeMetrics;
use crate::error::SceneError;
use crate::geometry::Point;
use crate::ir::NodeSpec;
use crate::routing::obstacle::Obstacle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConnectorId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LinkId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectorRole {
    DataInput,
    DataOutput,
    FlowIn,
    FlowOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoleClass {
    Data,
    Flow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Single,
    Unbounded,
}

impl ConnectorRole {
    pub fn class(self) -> RoleClass {
        match self {
            ConnectorRole::DataInput | ConnectorRole::DataOutput => RoleClass::Data,
            ConnectorRole::FlowIn | ConnectorRole::FlowOut => RoleClass::Flow,
        }
    }

    /// Inputs and flow-ins fill a link's `from` slot.
    pub fn is_input_like(self) -> bool {
        matches!(self, ConnectorRole::DataInput | ConnectorRole::FlowIn)
    }

    pub fn capacity(self) -> Capacity {
        if self.is_input_like() {
            Capacity::Single
        } else {
            Capacity::Unbounded
        }
    }

    pub fn complements(self, other: ConnectorRole) -> bool {
        self.class() == other.class() && self.is_input_like() != other.is_input_like()
    }
}

#[derive(Debug, Clone)]
pub struct Connector {
    pub key: String,
    pub name: String,
    pub node: NodeId,
    pub role: ConnectorRole,
    links: Vec<LinkId>,
}

impl Connector {
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// True when another link would break this connector's capacity.
    pub fn is_saturated(&self) -> bool {
        match self.role.capacity() {
            Capacity::Single => !self.links.is_empty(),
            Capacity::Unbounded => false,
        }
    }
}

/// Edge between an input-like connector (`from`) and an output-like
/// connector (`to`). Either slot stays empty until it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Link {
    pub from: Option<ConnectorId>,
    pub to: Option<ConnectorId>,
}

impl Link {
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Binds the connector into the slot matching its role. Returns false
    /// when that slot is already taken.
    pub fn bind(&mut self, connector: ConnectorId, role: ConnectorRole) -> bool {
        let slot = if role.is_input_like() {
            &mut self.from
        } else {
            &mut self.to
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(connector);
        true
    }

    /// The input-like end when bound, otherwise the output-like end.
    pub fn start_connector(&self) -> Option<ConnectorId> {
        self.from.or(self.to)
    }

    pub fn endpoints(&self) -> Option<(ConnectorId, ConnectorId)> {
        Some((self.from?, self.to?))
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub key: String,
    pub module: String,
    pub name: String,
    pub position: Point,
    pub width: f32,
    pub height: f32,
    pub inputs: Vec<ConnectorId>,
    pub outputs: Vec<ConnectorId>,
    pub flow_in: ConnectorId,
    pub flow_out: ConnectorId,
}

impl Node {
    /// Geometry is validated whenever it is set, so the rectangle is built
    /// directly.
    pub fn obstacle(&self) -> Obstacle {
        Obstacle {
            x: self.position.x,
            y: self.position.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn connectors(&self) -> impl Iterator<Item = ConnectorId> + '_ {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .copied()
            .chain([self.flow_in, self.flow_out])
    }
}

/// Arena of nodes, connectors and links. Back-references (connector to
/// node, link to connector) are handles into the arena.
#[derive(Debug, Clone)]
pub struct Scene {
    metrics: NodeMetrics,
    nodes: BTreeMap<NodeId, Node>,
    connectors: BTreeMap<ConnectorId, Connector>,
    links: BTreeMap<LinkId, Link>,
    next_node: usize,
    next_connector: usize,
    next_link: usize,
}

impl Scene {
    pub fn new(metrics: NodeMetrics) -> Self {
        Self {
            metrics,
            nodes: BTreeMap::new(),
            connectors: BTreeMap::new(),
            links: BTreeMap::new(),
            next_node: 0,
            next_connector: 0,
            next_link: 0,
        }
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    pub fn add_node(&mut self, spec: &NodeSpec) -> Result<NodeId, SceneError> {
        if self.find_node(&spec.id).is_some() {
            return Err(SceneError::DuplicateNode(spec.id.clone()));
        }
        let flow_in_key = format!("{}.flow_in", spec.id);
        let flow_out_key = format!("{}.flow_out", spec.id);
        let mut seen: Vec<&str> = Vec::new();
        for key in spec
            .inputs
            .iter()
            .chain(spec.outputs.iter())
            .map(|c| c.id.as_str())
            .chain([flow_in_key.as_str(), flow_out_key.as_str()])
        {
            if seen.contains(&key) || self.find_connector(key).is_some() {
                return Err(SceneError::DuplicateConnector(key.to_string()));
            }
            seen.push(key);
        }

        let position = spec.position.unwrap_or_default();
        let width = self.node_width(spec);
        let height = self.node_height(spec.inputs.len(), spec.outputs.len());
        Obstacle::new(position.x, position.y, width, height)?;

        let node_id = NodeId(self.next_node);
        self.next_node += 1;

        let inputs = spec
            .inputs
            .iter()
            .map(|c| self.push_connector(node_id, &c.id, &c.name, ConnectorRole::DataInput))
            .collect();
        let outputs = spec
            .outputs
            .iter()
            .map(|c| self.push_connector(node_id, &c.id, &c.name, ConnectorRole::DataOutput))
            .collect();
        let flow_in = self.push_connector(node_id, &flow_in_key, "in", ConnectorRole::FlowIn);
        let flow_out = self.push_connector(node_id, &flow_out_key, "out", ConnectorRole::FlowOut);

        self.nodes.insert(
            node_id,
            Node {
                key: spec.id.clone(),
                module: spec.module.clone(),
                name: spec.name.clone(),
                position,
                width,
                height,
                inputs,
                outputs,
                flow_in,
                flow_out,
            },
        );
        tracing::debug!(node = %spec.id, width, height, "added node");
        Ok(node_id)
    }

    fn push_connector(
        &mut self,
        node: NodeId,
        key: &str,
        name: &str,
        role: ConnectorRole,
    ) -> ConnectorId {
        let id = ConnectorId(self.next_connector);
        self.next_connector += 1;
        self.connectors.insert(
            id,
            Connector {
                key: key.to_string(),
                name: name.to_string(),
                node,
                role,
                links: Vec::new(),
            },
        );
        id
    }

    fn node_height(&self, inputs: usize, outputs: usize) -> f32 {
        let m = &self.metrics;
        let per_row = m.connector_radius + m.connector_spacing;
        (inputs as f32 * per_row + m.base_height).max(outputs as f32 * per_row + m.base_height)
    }

    fn node_width(&self, spec: &NodeSpec) -> f32 {
        let m = &self.metrics;
        let longest = |list: &[crate::ir::ConnectorSpec]| {
            list.iter().map(|c| c.name.chars().count()).max().unwrap_or(0)
        };
        let names = (longest(&spec.inputs) + longest(&spec.outputs)) as f32;
        (m.node_spacing + names * m.connector_char_width)
            .max(spec.module.chars().count() as f32 * m.module_char_width)
            .max(spec.name.chars().count() as f32 * m.name_char_width)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links.iter().map(|(id, link)| (*id, link))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn find_node(&self, key: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.key == key)
            .map(|(id, _)| *id)
    }

    pub fn find_connector(&self, key: &str) -> Option<ConnectorId> {
        self.connectors
            .iter()
            .find(|(_, c)| c.key == key)
            .map(|(id, _)| *id)
    }

    pub fn find_input(&self, key: &str) -> Option<ConnectorId> {
        self.find_connector(key)
            .filter(|id| self.connectors[id].role == ConnectorRole::DataInput)
    }

    pub fn find_output(&self, key: &str) -> Option<ConnectorId> {
        self.find_connector(key)
            .filter(|id| self.connectors[id].role == ConnectorRole::DataOutput)
    }

    /// Data input of `node` whose display name is `name`.
    pub fn node_input(&self, node: NodeId, name: &str) -> Option<ConnectorId> {
        self.nodes
            .get(&node)?
            .inputs
            .iter()
            .copied()
            .find(|id| self.connectors[id].name == name)
    }

    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), SceneError> {
        if !position.is_finite() {
            return Err(SceneError::NonFiniteGeometry);
        }
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        node.position = position;
        Ok(())
    }

    /// Moves a node by a relative offset, as a drag step does.
    pub fn translate(&mut self, id: NodeId, dx: f32, dy: f32) -> Result<(), SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?;
        let position = Point::new(node.position.x + dx, node.position.y + dy);
        self.set_position(id, position)
    }

    /// Overrides the computed size of a node.
    pub fn resize(&mut self, id: NodeId, width: f32, height: f32) -> Result<(), SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?;
        let checked = Obstacle::new(node.position.x, node.position.y, width, height)?;
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        node.width = checked.width;
        node.height = checked.height;
        Ok(())
    }

    /// Places every node left to right in rows, wrapping once the running
    /// x passes `auto_layout_width`.
    pub fn auto_layout(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        self.place_in_rows(&ids);
    }

    /// Row placement restricted to `ids`, in the given order.
    pub fn place_in_rows(&mut self, ids: &[NodeId]) {
        let limit = self.metrics.auto_layout_width;
        let mut x = 0.0f32;
        let mut y = 0.0f32;
        let mut row_height = 0.0f32;
        for id in ids {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            node.position = Point::new(x, y);
            x += node.width;
            row_height = row_height.max(node.height);
            if x > limit {
                x = 0.0;
                y += row_height;
                row_height = 0.0;
            }
        }
    }

    /// Node rectangles in arena order, paired with their node handles.
    pub fn obstacles(&self) -> Vec<(NodeId, Obstacle)> {
        self.nodes
            .iter()
            .map(|(id, node)| (*id, node.obstacle()))
            .collect()
    }

    /// Absolute position where links attach to a connector.
    pub fn anchor(&self, id: ConnectorId) -> Option<Point> {
        let connector = self.connectors.get(&id)?;
        let node = self.nodes.get(&connector.node)?;
        let m = &self.metrics;
        let Point { x, y } = node.position;
        let row = |list: &[ConnectorId]| list.iter().position(|c| *c == id).unwrap_or(0);
        let point = match connector.role {
            ConnectorRole::DataInput => Point::new(
                x + m.connector_spacing / 2.0,
                y + m.base_height + m.connector_spacing * (row(&node.inputs) + 1) as f32,
            ),
            ConnectorRole::DataOutput => Point::new(
                x + node.width - m.connector_spacing / 2.0,
                y + m.base_height + m.connector_spacing * (row(&node.outputs) + 1) as f32,
            ),
            ConnectorRole::FlowIn => Point::new(
                x + m.flow_socket_size / 2.0,
                y + m.base_height - m.flow_socket_inset + m.flow_socket_size / 2.0,
            ),
            ConnectorRole::FlowOut => Point::new(
                x + node.width - m.flow_socket_size / 2.0,
                y + m.base_height - m.flow_socket_inset + m.flow_socket_size / 2.0,
            ),
        };
        Some(point)
    }

    pub(crate) fn insert_link(&mut self, from: ConnectorId, to: ConnectorId) -> LinkId {
        let id = LinkId(self.next_link);
        self.next_link += 1;
        self.links.insert(
            id,
            Link {
                from: Some(from),
                to: Some(to),
            },
        );
        for end in [from, to] {
            if let Some(connector) = self.connectors.get_mut(&end) {
                connector.links.push(id);
            }
        }
        id
    }

    /// Removes a link and unregisters it from both of its connectors.
    pub fn delete_link(&mut self, id: LinkId) -> Result<Link, SceneError> {
        let link = self.links.remove(&id).ok_or(SceneError::UnknownLink(id))?;
        for end in [link.from, link.to].into_iter().flatten() {
            if let Some(connector) = self.connectors.get_mut(&end) {
                connector.links.retain(|held| *held != id);
            }
        }
        tracing::debug!(link = id.0, "deleted link");
        Ok(link)
    }

    /// Removes a node, its connectors and every link attached to them.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Vec<LinkId>, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?;
        let connectors: Vec<ConnectorId> = node.connectors().collect();
        let mut doomed: Vec<LinkId> = connectors
            .iter()
            .filter_map(|c| self.connectors.get(c))
            .flat_map(|c| c.links.iter().copied())
            .collect();
        doomed.sort();
        doomed.dedup();
        for link in &doomed {
            self.delete_link(*link)?;
        }
        for connector in connectors {
            self.connectors.remove(&connector);
        }
        self.nodes.remove(&id);
        Ok(doomed)
    }

    pub fn link_class(&self, id: LinkId) -> Option<RoleClass> {
        let connector = self.links.get(&id)?.start_connector()?;
        Some(self.connectors.get(&connector)?.role.class())
    }
}
