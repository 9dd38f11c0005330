use std::path::Path;

use node_wiring::config::Config;
use node_wiring::editor::Editor;
use node_wiring::geometry::{Point, distance};
use node_wiring::ir::parse_scene;
use node_wiring::route_dump::RouteDump;
use node_wiring::routing::{Curve, RoutingFrame};
use node_wiring::scene::RoleClass;
use node_wiring::wiring::{ClickOutcome, RejectReason};

fn load_fixture(name: &str) -> (Editor, Vec<ClickOutcome>) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    let spec = parse_scene(&input).expect("fixture parse failed");
    Editor::from_spec(&spec, &Config::default()).expect("fixture scene failed")
}

fn data_path(frame: &RoutingFrame) -> Vec<Point> {
    let routed = frame
        .links
        .iter()
        .find(|l| l.class == RoleClass::Data)
        .expect("no data link");
    match routed.curve.as_ref().expect("data link unroutable") {
        Curve::Routed { path } => path.points().to_vec(),
        other => panic!("data link should be routed, got {other:?}"),
    }
}

fn path_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

fn assert_clear_of_node(editor: &Editor, frame: &RoutingFrame, points: &[Point], node_key: &str) {
    let id = editor.scene().find_node(node_key).expect("node");
    let obstacle = editor.scene().node(id).expect("node").obstacle();
    let margin = frame.graph.margin();
    for pair in points.windows(2) {
        assert!(
            !obstacle.blocks_segment(margin, pair[0], pair[1]),
            "segment {:?} -> {:?} cuts through '{node_key}'",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn data_link_detours_around_wall() {
    let (editor, outcomes) = load_fixture("wall_detour.json");
    assert!(
        outcomes
            .iter()
            .all(|o| matches!(o, ClickOutcome::Created { .. }))
    );

    let frame = editor.frame();
    let points = data_path(&frame);
    assert!(points.len() > 4, "expected corner waypoints, got {points:?}");
    assert_clear_of_node(&editor, &frame, &points, "wall");

    let scene = editor.scene();
    let out = scene.anchor(scene.find_connector("src.out").unwrap()).unwrap();
    let input = scene.anchor(scene.find_connector("dst.in").unwrap()).unwrap();
    assert_eq!(points.first().copied(), Some(out));
    assert_eq!(points.last().copied(), Some(input));
    assert!(path_length(&points) > distance(out, input));
}

#[test]
fn flow_link_ignores_obstacles() {
    let (editor, _) = load_fixture("wall_detour.json");
    let frame = editor.frame();
    let flow = frame
        .links
        .iter()
        .find(|l| l.class == RoleClass::Flow)
        .expect("flow link");
    assert!(matches!(
        flow.curve,
        Some(Curve::Direct { control: None, .. })
    ));
}

#[test]
fn dragging_the_wall_away_straightens_the_route() {
    let (mut editor, _) = load_fixture("wall_detour.json");
    let detour = path_length(&data_path(&editor.frame()));

    let frame = editor
        .drag_node("wall", Point::new(300.0, 600.0))
        .expect("drag");
    let straight = data_path(&frame);
    assert_eq!(straight.len(), 4);
    assert!(straight.iter().all(|p| p.y == straight[0].y));
    assert!(path_length(&straight) < detour);

    let frame = editor
        .drag_node("wall", Point::new(300.0, -100.0))
        .expect("drag back");
    let again = data_path(&frame);
    assert!((path_length(&again) - detour).abs() < 1e-3);
}

#[test]
fn removing_the_wall_keeps_links_between_other_nodes() {
    let (mut editor, _) = load_fixture("wall_detour.json");
    let trashed = editor.remove_node("wall").expect("remove");
    assert!(trashed.is_empty());
    assert_eq!(editor.scene().link_count(), 2);
    assert_eq!(data_path(&editor.frame()).len(), 4);
}

#[test]
fn fan_out_respects_capacity_and_classes() {
    let (editor, outcomes) = load_fixture("fan_out.json");
    let scene = editor.scene();
    let b_in = scene.find_connector("b.in").unwrap();

    assert!(matches!(outcomes[0], ClickOutcome::Created { .. }));
    assert!(matches!(outcomes[1], ClickOutcome::Created { .. }));
    assert_eq!(
        outcomes[2],
        ClickOutcome::Rejected {
            reason: RejectReason::CapacityExhausted(b_in)
        }
    );
    assert_eq!(
        outcomes[3],
        ClickOutcome::Rejected {
            reason: RejectReason::ClassMismatch
        }
    );
    assert_eq!(
        outcomes[4],
        ClickOutcome::Rejected {
            reason: RejectReason::SameRole
        }
    );

    assert_eq!(scene.link_count(), 2);
    let a_out = scene.find_connector("a.out").unwrap();
    assert_eq!(scene.connector(a_out).unwrap().links().len(), 2);
    assert_eq!(scene.connector(b_in).unwrap().links().len(), 1);
    let flow_in = scene.find_connector("b.flow_in").unwrap();
    assert!(scene.connector(flow_in).unwrap().links().is_empty());
    assert!(editor.pending().is_none());
}

#[test]
fn fan_out_routes_every_link_clear_of_other_nodes() {
    let (editor, _) = load_fixture("fan_out.json");
    let frame = editor.frame();
    assert_eq!(frame.links.len(), 2);
    for routed in &frame.links {
        let Some(Curve::Routed { path }) = &routed.curve else {
            panic!("link {:?} not routed", routed.link);
        };
        let (from, to) = editor.scene().link(routed.link).unwrap().endpoints().unwrap();
        let ends = [from, to].map(|c| editor.scene().connector(c).unwrap().node);
        for (id, node) in editor.scene().nodes() {
            if ends.contains(&id) {
                continue;
            }
            assert_clear_of_node(&editor, &frame, path.points(), &node.key);
        }
    }
}

#[test]
fn route_dump_reports_link_keys() {
    let (editor, _) = load_fixture("fan_out.json");
    let dump = RouteDump::from_frame(editor.scene(), &editor.frame());
    let json = serde_json::to_value(&dump).unwrap();
    let links = json["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["from"], "b.in");
    assert_eq!(links[0]["to"], "a.out");
    assert_eq!(links[1]["from"], "c.in");
    assert!(links.iter().all(|l| l["routed"] == true));
}
