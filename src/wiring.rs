//! Click-driven pairing of connectors into links.
//!
//! The interaction is either idle (`None`) or waiting for a second
//! connector (`Some(PendingLink)`). The pending value is passed into and
//! returned from [`handle_click`]; every second click resolves it, whether
//! a link is created or not.

use serde::Serialize;

use crate::error::SceneError;
use crate::geometry::Point;
use crate::scene::{Connector, ConnectorId, Link, LinkId, Scene};

/// A link under construction that holds its first endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLink {
    link: Link,
    origin: ConnectorId,
    cursor: Option<Point>,
}

impl PendingLink {
    pub fn origin(&self) -> ConnectorId {
        self.origin
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Last pointer position seen while pending.
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "reason", content = "connector")]
pub enum RejectReason {
    /// Both clicks landed on input-like or both on output-like connectors.
    SameRole,
    /// A data connector was paired with a flow connector.
    ClassMismatch,
    /// The named single-link connector already holds a link.
    CapacityExhausted(ConnectorId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ClickOutcome {
    Pending { connector: ConnectorId },
    Created { link: LinkId },
    Rejected { reason: RejectReason },
}

/// Decides whether `first` and `second` may be joined into a link.
pub fn check_pairing(
    first: (ConnectorId, &Connector),
    second: (ConnectorId, &Connector),
) -> Result<(), RejectReason> {
    let (first_id, first) = first;
    let (second_id, second) = second;
    if first.role.class() != second.role.class() {
        return Err(RejectReason::ClassMismatch);
    }
    if !first.role.complements(second.role) {
        return Err(RejectReason::SameRole);
    }
    if second.is_saturated() {
        return Err(RejectReason::CapacityExhausted(second_id));
    }
    if first.is_saturated() {
        return Err(RejectReason::CapacityExhausted(first_id));
    }
    Ok(())
}

/// Applies a click on `clicked` to the pending state.
///
/// Returns the new pending state together with what happened. Clicking an
/// unknown connector is an error and leaves `pending` untouched in the
/// returned state.
pub fn handle_click(
    scene: &mut Scene,
    pending: Option<PendingLink>,
    clicked: ConnectorId,
) -> Result<(Option<PendingLink>, ClickOutcome), SceneError> {
    let Some(second) = scene.connector(clicked) else {
        return Err(SceneError::UnknownConnector(clicked));
    };

    let Some(mut pending) = pending else {
        let mut link = Link::unbound();
        link.bind(clicked, second.role);
        tracing::debug!(connector = %second.key, "waiting for second connector");
        let pending = PendingLink {
            link,
            origin: clicked,
            cursor: None,
        };
        return Ok((
            Some(pending),
            ClickOutcome::Pending { connector: clicked },
        ));
    };

    let first = scene
        .connector(pending.origin)
        .ok_or(SceneError::UnknownConnector(pending.origin))?;

    if let Err(reason) = check_pairing((pending.origin, first), (clicked, second)) {
        tracing::warn!(
            first = %first.key,
            second = %second.key,
            ?reason,
            "rejected link"
        );
        return Ok((None, ClickOutcome::Rejected { reason }));
    }

    // Complementary roles always land in the free slot.
    pending.link.bind(clicked, second.role);
    let Some((from, to)) = pending.link.endpoints() else {
        return Ok((
            None,
            ClickOutcome::Rejected {
                reason: RejectReason::SameRole,
            },
        ));
    };
    let link = scene.insert_link(from, to);
    tracing::debug!(link = link.0, from = from.0, to = to.0, "created link");
    Ok((None, ClickOutcome::Created { link }))
}

/// Drops any pending selection, e.g. after a click on empty canvas.
pub fn cancel(pending: Option<PendingLink>) -> Option<PendingLink> {
    if let Some(pending) = pending {
        tracing::debug!(connector = pending.origin.0, "discarded pending link");
    }
    None
}

/// Records the pointer position while a link is pending and returns the
/// provisional segment from the origin anchor to the cursor.
pub fn pointer_move(scene: &Scene, pending: &mut PendingLink, cursor: Point) -> Option<(Point, Point)> {
    pending.cursor = Some(cursor);
    let anchor = scene.anchor(pending.origin)?;
    Some((anchor, cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeMetrics;
    use crate::ir::{ConnectorSpec, NodeSpec};

    fn connector(id: &str) -> ConnectorSpec {
        ConnectorSpec {
            id: id.to_string(),
            name: id.rsplit('.').next().unwrap_or(id).to_string(),
        }
    }

    fn scene() -> Scene {
        let mut scene = Scene::new(NodeMetrics::default());
        scene
            .add_node(&NodeSpec {
                id: "a".to_string(),
                module: String::new(),
                name: "A".to_string(),
                inputs: vec![connector("a.in")],
                outputs: vec![connector("a.out")],
                position: None,
            })
            .unwrap();
        scene
            .add_node(&NodeSpec {
                id: "b".to_string(),
                module: String::new(),
                name: "B".to_string(),
                inputs: vec![connector("b.in")],
                outputs: vec![connector("b.out")],
                position: None,
            })
            .unwrap();
        scene
    }

    fn id(scene: &Scene, key: &str) -> ConnectorId {
        scene.find_connector(key).unwrap()
    }

    fn click_pair(scene: &mut Scene, first: &str, second: &str) -> ClickOutcome {
        let (first, second) = (id(scene, first), id(scene, second));
        let (pending, outcome) = handle_click(scene, None, first).unwrap();
        assert_eq!(outcome, ClickOutcome::Pending { connector: first });
        let (pending, outcome) = handle_click(scene, pending, second).unwrap();
        assert!(pending.is_none());
        outcome
    }

    #[test]
    fn output_then_input_creates_link() {
        let mut scene = scene();
        let outcome = click_pair(&mut scene, "a.out", "b.in");
        let ClickOutcome::Created { link } = outcome else {
            panic!("expected a link, got {outcome:?}");
        };
        let stored = scene.link(link).unwrap();
        assert_eq!(stored.from, Some(id(&scene, "b.in")));
        assert_eq!(stored.to, Some(id(&scene, "a.out")));
        assert_eq!(scene.connector(id(&scene, "a.out")).unwrap().links(), &[link]);
        assert_eq!(scene.connector(id(&scene, "b.in")).unwrap().links(), &[link]);
    }

    #[test]
    fn input_first_works_too() {
        let mut scene = scene();
        assert!(matches!(
            click_pair(&mut scene, "b.in", "a.out"),
            ClickOutcome::Created { .. }
        ));
    }

    #[test]
    fn same_role_is_rejected() {
        let mut scene = scene();
        assert_eq!(
            click_pair(&mut scene, "a.out", "b.out"),
            ClickOutcome::Rejected {
                reason: RejectReason::SameRole
            }
        );
        assert_eq!(scene.link_count(), 0);
    }

    #[test]
    fn data_output_to_flow_in_is_rejected_without_side_effects() {
        let mut scene = scene();
        let out = id(&scene, "a.out");
        let flow_in = id(&scene, "b.flow_in");
        assert_eq!(
            click_pair(&mut scene, "a.out", "b.flow_in"),
            ClickOutcome::Rejected {
                reason: RejectReason::ClassMismatch
            }
        );
        assert!(scene.connector(out).unwrap().links().is_empty());
        assert!(scene.connector(flow_in).unwrap().links().is_empty());
    }

    #[test]
    fn data_input_holds_a_single_link() {
        let mut scene = scene();
        assert!(matches!(
            click_pair(&mut scene, "a.out", "b.in"),
            ClickOutcome::Created { .. }
        ));
        let input = id(&scene, "b.in");
        assert_eq!(
            click_pair(&mut scene, "b.out", "b.in"),
            ClickOutcome::Rejected {
                reason: RejectReason::CapacityExhausted(input)
            }
        );
        // Clicked first it is rejected as well.
        assert_eq!(
            click_pair(&mut scene, "b.in", "b.out"),
            ClickOutcome::Rejected {
                reason: RejectReason::CapacityExhausted(input)
            }
        );
        assert_eq!(scene.connector(input).unwrap().links().len(), 1);
    }

    #[test]
    fn data_output_accepts_many_links() {
        let mut scene = scene();
        assert!(matches!(
            click_pair(&mut scene, "a.out", "b.in"),
            ClickOutcome::Created { .. }
        ));
        assert!(matches!(
            click_pair(&mut scene, "a.out", "a.in"),
            ClickOutcome::Created { .. }
        ));
        assert_eq!(scene.connector(id(&scene, "a.out")).unwrap().links().len(), 2);
    }

    #[test]
    fn flow_ports_pair_with_single_flow_in() {
        let mut scene = scene();
        assert!(matches!(
            click_pair(&mut scene, "a.flow_out", "b.flow_in"),
            ClickOutcome::Created { .. }
        ));
        assert!(matches!(
            click_pair(&mut scene, "b.flow_out", "b.flow_in"),
            ClickOutcome::Rejected {
                reason: RejectReason::CapacityExhausted(_)
            }
        ));
        assert!(matches!(
            click_pair(&mut scene, "a.flow_out", "a.flow_in"),
            ClickOutcome::Created { .. }
        ));
    }

    #[test]
    fn deleting_a_link_frees_both_ends() {
        let mut scene = scene();
        let ClickOutcome::Created { link } = click_pair(&mut scene, "a.out", "b.in") else {
            panic!("expected a link");
        };
        scene.delete_link(link).unwrap();
        assert!(scene.connector(id(&scene, "a.out")).unwrap().links().is_empty());
        assert!(scene.connector(id(&scene, "b.in")).unwrap().links().is_empty());
        assert!(matches!(
            click_pair(&mut scene, "b.out", "b.in"),
            ClickOutcome::Created { .. }
        ));
    }

    #[test]
    fn pointer_move_tracks_cursor_from_origin_anchor() {
        let mut scene = scene();
        let out = id(&scene, "a.out");
        let (pending, _) = handle_click(&mut scene, None, out).unwrap();
        let mut pending = pending.unwrap();
        let cursor = Point::new(400.0, 300.0);
        let segment = pointer_move(&scene, &mut pending, cursor).unwrap();
        assert_eq!(segment, (scene.anchor(out).unwrap(), cursor));
        assert_eq!(pending.cursor(), Some(cursor));
        assert!(cancel(Some(pending)).is_none());
    }

    #[test]
    fn unknown_connector_is_an_error() {
        let mut scene = scene();
        assert_eq!(
            handle_click(&mut scene, None, ConnectorId(999)).unwrap_err(),
            SceneError::UnknownConnector(ConnectorId(999))
        );
    }
}
