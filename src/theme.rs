use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub node_fill: String,
    pub node_border: String,
    pub title_fill: String,
    pub text_color: String,
    pub socket_fill: String,
    pub socket_border: String,
    pub flow_socket_fill: String,
    pub data_link_color: String,
    pub flow_link_color: String,
    pub provisional_link_color: String,
    pub graph_edge_color: String,
    pub clearance_color: String,
}

impl Theme {
    pub fn editor_dark() -> Self {
        Self {
            font_family: "Calibri, sans-serif".to_string(),
            font_size: 12.0,
            background: "#2B2B2B".to_string(),
            node_fill: "#555555".to_string(),
            node_border: "#000000".to_string(),
            title_fill: "#808080".to_string(),
            text_color: "#FFFFFF".to_string(),
            socket_fill: "#DDDDDD".to_string(),
            socket_border: "#666666".to_string(),
            flow_socket_fill: "#6C0277".to_string(),
            data_link_color: "#FF0000".to_string(),
            flow_link_color: "#00FFFF".to_string(),
            provisional_link_color: "#FF0000".to_string(),
            graph_edge_color: "rgba(255, 0, 0, 0.35)".to_string(),
            clearance_color: "rgba(255, 255, 255, 0.15)".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            title_fill: "#EEF2F8".to_string(),
            text_color: "#1C2430".to_string(),
            socket_fill: "#FFFFFF".to_string(),
            socket_border: "#7A8AA6".to_string(),
            flow_socket_fill: "#9370DB".to_string(),
            data_link_color: "#D14343".to_string(),
            flow_link_color: "#2A9DB5".to_string(),
            provisional_link_color: "#7A8AA6".to_string(),
            graph_edge_color: "rgba(209, 67, 67, 0.3)".to_string(),
            clearance_color: "rgba(28, 36, 48, 0.08)".to_string(),
        }
    }
}
