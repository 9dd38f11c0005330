use thiserror::Error;

use crate::scene::{ConnectorId, LinkId, NodeId};

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("obstacle has negative size {width}x{height}")]
    NegativeSize { width: f32, height: f32 },
    #[error("obstacle geometry is not finite")]
    NonFiniteGeometry,
    #[error("duplicate node key '{0}'")]
    DuplicateNode(String),
    #[error("duplicate connector key '{0}'")]
    DuplicateConnector(String),
    #[error("unknown node key '{0}'")]
    UnknownNodeKey(String),
    #[error("unknown connector key '{0}'")]
    UnknownConnectorKey(String),
    #[error("no node with handle {0:?}")]
    UnknownNode(NodeId),
    #[error("no connector with handle {0:?}")]
    UnknownConnector(ConnectorId),
    #[error("no link with handle {0:?}")]
    UnknownLink(LinkId),
}
