use node_wiring::config::Config;
use node_wiring::editor::Editor;
use node_wiring::geometry::Point;
use node_wiring::ir::parse_scene;
use node_wiring::render::render_svg;
use node_wiring::route_dump::RouteDump;
use node_wiring::scene::LinkId;
use node_wiring::theme::Theme;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WiringOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    clearance_margin: Option<f32>,
    show_graph: Option<bool>,
}

fn js_error(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn build_config(options: WiringOptions) -> Result<Config, String> {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("light") {
        config.theme = Theme::light();
        config.render.background = config.theme.background.clone();
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(margin) = options.clearance_margin {
        if !margin.is_finite() || margin < 0.0 {
            return Err(format!("clearanceMargin must be a non-negative number, got {margin}"));
        }
        config.routing.clearance_margin = margin;
    }
    if let Some(show_graph) = options.show_graph {
        config.render.show_visibility_graph = show_graph;
    }
    Ok(config)
}

/// Browser-side editor session. Every method returns JSON or SVG strings so
/// the host page never touches Rust types.
#[wasm_bindgen]
pub struct WiringEditor {
    editor: Editor,
    config: Config,
}

#[wasm_bindgen]
impl WiringEditor {
    #[wasm_bindgen(constructor)]
    pub fn new(scene_json: &str, options_json: Option<String>) -> Result<WiringEditor, JsValue> {
        let options = match options_json {
            Some(raw) => serde_json::from_str::<WiringOptions>(&raw).map_err(js_error)?,
            None => WiringOptions::default(),
        };
        let config = build_config(options).map_err(js_error)?;
        let spec = parse_scene(scene_json).map_err(js_error)?;
        let (editor, _) = Editor::from_spec(&spec, &config).map_err(js_error)?;
        Ok(WiringEditor { editor, config })
    }

    /// Clicks a connector by key and returns the outcome as JSON.
    pub fn click(&mut self, connector_key: &str) -> Result<String, JsValue> {
        let outcome = self.editor.click(connector_key).map_err(js_error)?;
        serde_json::to_string(&outcome).map_err(js_error)
    }

    /// Returns the provisional curve's SVG path data, or nothing when no
    /// link is pending.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<String> {
        self.editor
            .pointer_move(Point::new(x, y))
            .map(|curve| node_wiring::render::curve_to_path(&curve))
    }

    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    pub fn drag_node(&mut self, node_key: &str, x: f32, y: f32) -> Result<String, JsValue> {
        let frame = self
            .editor
            .drag_node(node_key, Point::new(x, y))
            .map_err(js_error)?;
        serde_json::to_string(&RouteDump::from_frame(self.editor.scene(), &frame)).map_err(js_error)
    }

    pub fn delete_link(&mut self, link_id: usize) -> Result<(), JsValue> {
        self.editor.delete_link(LinkId(link_id)).map_err(js_error)
    }

    pub fn frame_json(&self) -> Result<String, JsValue> {
        let frame = self.editor.frame();
        serde_json::to_string(&RouteDump::from_frame(self.editor.scene(), &frame)).map_err(js_error)
    }

    pub fn render_svg(&self, with_provisional: bool) -> String {
        let frame = self.editor.frame();
        let provisional = if with_provisional {
            self.provisional()
        } else {
            None
        };
        render_svg(
            self.editor.scene(),
            &frame,
            provisional.as_ref(),
            &self.config.theme,
            &self.config.render,
        )
    }
}

impl WiringEditor {
    fn provisional(&self) -> Option<node_wiring::routing::Curve> {
        let pending = self.editor.pending()?;
        let cursor = pending.cursor()?;
        let mut editor = self.editor.clone();
        editor.pointer_move(cursor)
    }
}
