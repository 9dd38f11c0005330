use crate::config::{Config, RoutingConfig};
use crate::error::SceneError;
use crate::geometry::Point;
use crate::ir::SceneSpec;
use crate::routing::{self, Curve, RoutingFrame};
use crate::scene::{ConnectorId, LinkId, NodeId, Scene};
use crate::wiring::{self, ClickOutcome, PendingLink};

/// Interaction host: owns the scene, the routing settings and the single
/// pending selection, and reroutes after every change that moves geometry.
#[derive(Debug, Clone)]
pub struct Editor {
    scene: Scene,
    routing: RoutingConfig,
    pending: Option<PendingLink>,
}

impl Editor {
    pub fn new(config: &Config) -> Self {
        Self {
            scene: Scene::new(config.metrics.clone()),
            routing: config.routing.clone(),
            pending: None,
        }
    }

    /// Builds the scene described by `spec`: nodes first, unplaced ones laid
    /// out in rows, then every connection replayed as two clicks.
    pub fn from_spec(spec: &SceneSpec, config: &Config) -> Result<(Self, Vec<ClickOutcome>), SceneError> {
        let mut editor = Self::new(config);
        let mut unplaced: Vec<NodeId> = Vec::new();
        for node in &spec.nodes {
            let id = editor.scene.add_node(node)?;
            if node.position.is_none() {
                unplaced.push(id);
            }
        }
        editor.scene.place_in_rows(&unplaced);

        let mut outcomes = Vec::with_capacity(spec.connections.len());
        for connection in &spec.connections {
            editor.click(&connection.first)?;
            outcomes.push(editor.click(&connection.second)?);
        }
        Ok((editor, outcomes))
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn pending(&self) -> Option<&PendingLink> {
        self.pending.as_ref()
    }

    pub fn click(&mut self, connector_key: &str) -> Result<ClickOutcome, SceneError> {
        let id = self
            .scene
            .find_connector(connector_key)
            .ok_or_else(|| SceneError::UnknownConnectorKey(connector_key.to_string()))?;
        self.click_connector(id)
    }

    pub fn click_connector(&mut self, id: ConnectorId) -> Result<ClickOutcome, SceneError> {
        let pending = self.pending.take();
        match wiring::handle_click(&mut self.scene, pending.clone(), id) {
            Ok((next, outcome)) => {
                self.pending = next;
                Ok(outcome)
            }
            Err(err) => {
                self.pending = pending;
                Err(err)
            }
        }
    }

    pub fn cancel(&mut self) {
        self.pending = wiring::cancel(self.pending.take());
    }

    /// Provisional curve from the pending connector to the cursor.
    pub fn pointer_move(&mut self, cursor: Point) -> Option<Curve> {
        let pending = self.pending.as_mut()?;
        let (start, end) = wiring::pointer_move(&self.scene, pending, cursor)?;
        Some(routing::direct_curve(start, end, 0.0))
    }

    /// Moves a node to an absolute position and reroutes every link.
    pub fn drag_node(&mut self, node_key: &str, position: Point) -> Result<RoutingFrame, SceneError> {
        let id = self.node_id(node_key)?;
        self.scene.set_position(id, position)?;
        Ok(self.frame())
    }

    pub fn delete_link(&mut self, id: LinkId) -> Result<(), SceneError> {
        self.scene.delete_link(id).map(|_| ())
    }

    pub fn remove_node(&mut self, node_key: &str) -> Result<Vec<LinkId>, SceneError> {
        let id = self.node_id(node_key)?;
        // A selection started on the removed node cannot complete.
        if let Some(pending) = &self.pending
            && self
                .scene
                .connector(pending.origin())
                .is_some_and(|c| c.node == id)
        {
            self.cancel();
        }
        self.scene.remove_node(id)
    }

    /// Fresh routing pass over the current scene.
    pub fn frame(&self) -> RoutingFrame {
        routing::route_scene(&self.scene, &self.routing)
    }

    fn node_id(&self, key: &str) -> Result<NodeId, SceneError> {
        self.scene
            .find_node(key)
            .ok_or_else(|| SceneError::UnknownNodeKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::parse_scene;
    use crate::wiring::RejectReason;

    const SCENE: &str = r#"{
        "nodes": [
            { "id": "a", "name": "A", "outputs": [{ "id": "a.out", "name": "out" }] },
            { "id": "b", "name": "B", "inputs": [{ "id": "b.in", "name": "in" }] },
            { "id": "c", "name": "C", "inputs": [{ "id": "c.in", "name": "in" }],
              "position": { "x": 0, "y": 400 } }
        ],
        "connections": [
            { "first": "a.out", "second": "b.in" },
            { "first": "a.out", "second": "c.flow_in" }
        ]
    }"#;

    fn editor() -> (Editor, Vec<ClickOutcome>) {
        Editor::from_spec(&parse_scene(SCENE).unwrap(), &Config::default()).unwrap()
    }

    #[test]
    fn replays_connections() {
        let (editor, outcomes) = editor();
        assert!(matches!(outcomes[0], ClickOutcome::Created { .. }));
        assert_eq!(
            outcomes[1],
            ClickOutcome::Rejected {
                reason: RejectReason::ClassMismatch
            }
        );
        assert_eq!(editor.scene().link_count(), 1);
        assert!(editor.pending().is_none());
    }

    #[test]
    fn unplaced_nodes_are_laid_out_in_a_row() {
        let (editor, _) = editor();
        let scene = editor.scene();
        let a = scene.node(scene.find_node("a").unwrap()).unwrap();
        let b = scene.node(scene.find_node("b").unwrap()).unwrap();
        let c = scene.node(scene.find_node("c").unwrap()).unwrap();
        assert_eq!(a.position, Point::new(0.0, 0.0));
        assert_eq!(b.position, Point::new(a.width, 0.0));
        assert_eq!(c.position, Point::new(0.0, 400.0));
    }

    #[test]
    fn drag_reroutes_links() {
        let (mut editor, _) = editor();
        let before = editor.frame();
        assert_eq!(before.links.len(), 1);
        let frame = editor.drag_node("b", Point::new(600.0, 300.0)).unwrap();
        let link = &frame.links[0];
        let Some(Curve::Routed { path }) = &link.curve else {
            panic!("expected a routed curve");
        };
        let input = editor.scene().find_connector("b.in").unwrap();
        assert_eq!(path.end(), editor.scene().anchor(input).unwrap());
    }

    #[test]
    fn pointer_move_needs_a_pending_link() {
        let (mut editor, _) = editor();
        assert!(editor.pointer_move(Point::new(5.0, 5.0)).is_none());
        editor.click("a.out").unwrap();
        let curve = editor.pointer_move(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(curve.points().last(), Some(&Point::new(5.0, 5.0)));
        editor.cancel();
        assert!(editor.pending().is_none());
    }

    #[test]
    fn unknown_click_keeps_pending_selection() {
        let (mut editor, _) = editor();
        editor.click("a.out").unwrap();
        assert_eq!(
            editor.click("nope").unwrap_err(),
            SceneError::UnknownConnectorKey("nope".to_string())
        );
        assert!(editor.pending().is_some());
    }

    #[test]
    fn removing_a_node_clears_links_and_selection() {
        let (mut editor, _) = editor();
        editor.click("b.flow_out").unwrap();
        let removed = editor.remove_node("b").unwrap();
        assert_eq!(removed.len(), 1);
        assert!(editor.pending().is_none());
        let out = editor.scene().find_connector("a.out").unwrap();
        assert!(editor.scene().connector(out).unwrap().links().is_empty());
    }
}
