use crate::config::RenderConfig;
use crate::geometry::Point;
use crate::routing::{Curve, RoutingFrame};
use crate::scene::{ConnectorRole, RoleClass, Scene};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const CANVAS_PAD: f32 = 40.0;
const TITLE_HEIGHT: f32 = 20.0;

/// Renders nodes, their sockets and every routed link of `frame` as SVG.
/// `provisional` is the in-progress curve of a pending link, if any.
pub fn render_svg(
    scene: &Scene,
    frame: &RoutingFrame,
    provisional: Option<&Curve>,
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let (min, max) = bounds(frame, provisional, frame.graph.margin());
    let width = (max.x - min.x).max(200.0);
    let height = (max.y - min.y).max(200.0);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{:.2} {:.2} {width:.2} {height:.2}\">",
        min.x, min.y
    ));
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        min.x, min.y, config.background
    ));

    if config.show_visibility_graph {
        let margin = frame.graph.margin();
        for (_, obstacle) in &frame.obstacles {
            let corners = obstacle.inflated_corners(margin);
            svg.push_str(&format!(
                "<polygon points=\"{}\" fill=\"{}\" stroke=\"none\"/>",
                points_attr(&corners),
                theme.clearance_color
            ));
        }
        for (from, to) in frame.graph.segments() {
            svg.push_str(&format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"0.6\"/>",
                from.x, from.y, to.x, to.y, theme.graph_edge_color
            ));
        }
    }

    for (_, node) in scene.nodes() {
        let Point { x, y } = node.position;
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            node.width, node.height, theme.node_fill, theme.node_border
        ));
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{TITLE_HEIGHT:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            node.width / 2.0,
            theme.title_fill,
            theme.node_border
        ));
        svg.push_str(&text_svg(x + 4.0, y + 14.0, &node.module, "start", theme.font_size, theme));
        let name_y = y + scene.metrics().base_height - 20.0;
        svg.push_str(&text_svg(x + 4.0, name_y, &node.name, "start", theme.font_size + 4.0, theme));

        for id in node.connectors() {
            let (Some(connector), Some(anchor)) = (scene.connector(id), scene.anchor(id)) else {
                continue;
            };
            svg.push_str(&socket_svg(anchor, connector.role, scene, theme));
            let radius = scene.metrics().connector_radius;
            match connector.role {
                ConnectorRole::DataInput => svg.push_str(&text_svg(
                    anchor.x + radius + 5.0,
                    anchor.y + 4.0,
                    &connector.name,
                    "start",
                    theme.font_size,
                    theme,
                )),
                ConnectorRole::DataOutput => svg.push_str(&text_svg(
                    anchor.x - radius - 5.0,
                    anchor.y + 4.0,
                    &connector.name,
                    "end",
                    theme.font_size,
                    theme,
                )),
                ConnectorRole::FlowIn | ConnectorRole::FlowOut => {}
            }
        }
    }

    for routed in &frame.links {
        let Some(curve) = &routed.curve else {
            continue;
        };
        let color = match routed.class {
            RoleClass::Data => &theme.data_link_color,
            RoleClass::Flow => &theme.flow_link_color,
        };
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
            curve_to_path(curve),
            color
        ));
    }

    if let Some(curve) = provisional {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"4\" stroke-dasharray=\"6 4\"/>",
            curve_to_path(curve),
            theme.provisional_link_color
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn bounds(frame: &RoutingFrame, provisional: Option<&Curve>, margin: f32) -> (Point, Point) {
    let mut min = Point::new(f32::MAX, f32::MAX);
    let mut max = Point::new(f32::MIN, f32::MIN);
    let mut grow = |p: Point| {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    };
    for (_, obstacle) in &frame.obstacles {
        obstacle.inflated_corners(margin).into_iter().for_each(&mut grow);
    }
    for curve in frame.links.iter().filter_map(|l| l.curve.as_ref()).chain(provisional) {
        curve.points().into_iter().for_each(&mut grow);
    }
    if min.x > max.x {
        return (Point::new(0.0, 0.0), Point::new(0.0, 0.0));
    }
    (
        Point::new(min.x - CANVAS_PAD, min.y - CANVAS_PAD),
        Point::new(max.x + CANVAS_PAD, max.y + CANVAS_PAD),
    )
}

fn socket_svg(anchor: Point, role: ConnectorRole, scene: &Scene, theme: &Theme) -> String {
    let metrics = scene.metrics();
    match role {
        ConnectorRole::DataInput | ConnectorRole::DataOutput => format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            anchor.x, anchor.y, metrics.connector_radius, theme.socket_fill, theme.socket_border
        ),
        ConnectorRole::FlowIn | ConnectorRole::FlowOut => {
            let size = metrics.flow_socket_size;
            format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{size:.2}\" height=\"{size:.2}\" rx=\"3\" ry=\"3\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
                anchor.x - size / 2.0,
                anchor.y - size / 2.0,
                theme.flow_socket_fill,
                theme.flow_link_color
            )
        }
    }
}

pub fn curve_to_path(curve: &Curve) -> String {
    match curve {
        Curve::Routed { path } => points_to_path(path.points()),
        Curve::Direct {
            start,
            control: Some(control),
            end,
        } => format!(
            "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            start.x, start.y, control.x, control.y, end.x, end.y
        ),
        Curve::Direct {
            start,
            control: None,
            end,
        } => points_to_path(&[*start, *end]),
    }
}

fn points_to_path(points: &[Point]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].x, points[0].y));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.x, point.y));
    }
    d
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn text_svg(x: f32, y: f32, text: &str, anchor: &str, size: f32, theme: &Theme) -> String {
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{size}\" fill=\"{}\">{}</text>",
        theme.font_family,
        theme.text_color,
        escape_xml(text)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Calibri".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::editor::Editor;
    use crate::ir::parse_scene;

    fn editor() -> Editor {
        let spec = parse_scene(
            r#"{
                "nodes": [
                    { "id": "a", "module": "math", "name": "Add <1>",
                      "outputs": [{ "id": "a.sum", "name": "sum" }] },
                    { "id": "b", "name": "Print", "inputs": [{ "id": "b.text", "name": "text" }] }
                ],
                "connections": [
                    { "first": "a.sum", "second": "b.text" },
                    { "first": "a.flow_out", "second": "b.flow_in" }
                ]
            }"#,
        )
        .unwrap();
        Editor::from_spec(&spec, &Config::default()).unwrap().0
    }

    #[test]
    fn render_svg_basic() {
        let editor = editor();
        let config = Config::default();
        let svg = render_svg(
            editor.scene(),
            &editor.frame(),
            None,
            &config.theme,
            &config.render,
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Add &lt;1&gt;"));
        assert!(svg.contains(&config.theme.data_link_color));
        assert!(svg.contains(&config.theme.flow_link_color));
        assert!(!svg.contains("<line"));
    }

    #[test]
    fn visibility_overlay_is_optional() {
        let editor = editor();
        let mut config = Config::default();
        config.render.show_visibility_graph = true;
        let svg = render_svg(
            editor.scene(),
            &editor.frame(),
            None,
            &config.theme,
            &config.render,
        );
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("<line"));
    }

    #[test]
    fn quadratic_direct_curve_path() {
        let curve = Curve::Direct {
            start: Point::new(0.0, 0.0),
            control: Some(Point::new(5.0, 5.0)),
            end: Point::new(10.0, 0.0),
        };
        assert_eq!(
            curve_to_path(&curve),
            "M 0.00 0.00 Q 5.00 5.00 10.00 0.00"
        );
    }
}
