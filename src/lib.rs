#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod render;
pub mod route_dump;
pub mod routing;
pub mod scene;
pub mod theme;
pub mod wiring;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, NodeMetrics, RenderConfig, RoutingConfig, load_config};
pub use editor::Editor;
pub use error::SceneError;
pub use geometry::{Point, distance, segments_cross};
pub use ir::{SceneSpec, parse_scene};
pub use render::render_svg;
pub use routing::{Curve, Obstacle, Path, RoutingFrame, VisibilityGraph, route_scene, shortest_path};
pub use scene::{ConnectorId, ConnectorRole, LinkId, NodeId, RoleClass, Scene};
pub use theme::Theme;
pub use wiring::{ClickOutcome, PendingLink, RejectReason, handle_click};
