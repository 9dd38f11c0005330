use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Clearance kept between a routed connector and every node rectangle.
    pub clearance_margin: f32,
    /// When set, a corner's own obstacle is skipped while testing the
    /// sightlines that leave that corner.
    pub exclude_owner_obstacle: bool,
    /// Perpendicular offset of the control point of flow-link curves.
    /// Zero draws flow links as straight segments.
    pub flow_curve_bend: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            clearance_margin: 20.0,
            exclude_owner_obstacle: false,
            flow_curve_bend: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub base_height: f32,
    pub connector_spacing: f32,
    pub connector_radius: f32,
    pub node_spacing: f32,
    pub flow_socket_size: f32,
    /// Distance from the bottom of the title band to the flow sockets.
    pub flow_socket_inset: f32,
    pub connector_char_width: f32,
    pub module_char_width: f32,
    pub name_char_width: f32,
    /// Row width used when nodes are placed automatically.
    pub auto_layout_width: f32,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            base_height: 60.0,
            connector_spacing: 20.0,
            connector_radius: 6.0,
            node_spacing: 100.0,
            flow_socket_size: 10.0,
            flow_socket_inset: 10.0,
            connector_char_width: 10.0,
            module_char_width: 10.0,
            name_char_width: 20.0,
            auto_layout_width: 1200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub show_visibility_graph: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            show_visibility_graph: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub routing: RoutingConfig,
    pub metrics: NodeMetrics,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::editor_dark();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            routing: RoutingConfig::default(),
            metrics: NodeMetrics::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    clearance_margin: Option<f32>,
    exclude_owner_obstacle: Option<bool>,
    flow_curve_bend: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeMetricsFile {
    base_height: Option<f32>,
    connector_spacing: Option<f32>,
    connector_radius: Option<f32>,
    node_spacing: Option<f32>,
    flow_socket_size: Option<f32>,
    flow_socket_inset: Option<f32>,
    connector_char_width: Option<f32>,
    module_char_width: Option<f32>,
    name_char_width: Option<f32>,
    auto_layout_width: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    background: Option<String>,
    node_fill: Option<String>,
    node_border: Option<String>,
    text_color: Option<String>,
    data_link_color: Option<String>,
    flow_link_color: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    routing: Option<RoutingConfigFile>,
    metrics: Option<NodeMetricsFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "light" => config.theme = Theme::light(),
            "dark" | "default" => config.theme = Theme::editor_dark(),
            other => anyhow::bail!("unknown theme '{other}'"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.data_link_color {
            config.theme.data_link_color = v;
        }
        if let Some(v) = vars.flow_link_color {
            config.theme.flow_link_color = v;
        }
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
    }

    if let Some(routing) = parsed.routing {
        if let Some(v) = routing.clearance_margin {
            if !v.is_finite() || v < 0.0 {
                anyhow::bail!("clearanceMargin must be a non-negative number, got {v}");
            }
            config.routing.clearance_margin = v;
        }
        if let Some(v) = routing.exclude_owner_obstacle {
            config.routing.exclude_owner_obstacle = v;
        }
        if let Some(v) = routing.flow_curve_bend {
            config.routing.flow_curve_bend = v;
        }
    }

    if let Some(metrics) = parsed.metrics {
        let m = &mut config.metrics;
        for (name, value, slot) in [
            ("baseHeight", metrics.base_height, &mut m.base_height),
            ("connectorSpacing", metrics.connector_spacing, &mut m.connector_spacing),
            ("connectorRadius", metrics.connector_radius, &mut m.connector_radius),
            ("nodeSpacing", metrics.node_spacing, &mut m.node_spacing),
            ("flowSocketSize", metrics.flow_socket_size, &mut m.flow_socket_size),
            ("flowSocketInset", metrics.flow_socket_inset, &mut m.flow_socket_inset),
            ("connectorCharWidth", metrics.connector_char_width, &mut m.connector_char_width),
            ("moduleCharWidth", metrics.module_char_width, &mut m.module_char_width),
            ("nameCharWidth", metrics.name_char_width, &mut m.name_char_width),
            ("autoLayoutWidth", metrics.auto_layout_width, &mut m.auto_layout_width),
        ] {
            let Some(v) = value else {
                continue;
            };
            if !v.is_finite() || v < 0.0 {
                anyhow::bail!("metrics.{name} must be a non-negative number, got {v}");
            }
            *slot = v;
        }
    }

    Ok(config)
}
