use crate::model::{ConnectionId, NodeId, PortId};
use thiserror::Error;

/// Errors returned by structural graph operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node not found: {0:?}")]
    UnknownNode(NodeId),

    #[error("Port not found: {0:?}")]
    UnknownPort(PortId),

    #[error("Connection not found: {0:?}")]
    UnknownConnection(ConnectionId),

    #[error("Connections must run from an output to an input")]
    InvalidDirection,

    #[error("Cannot connect a node to itself")]
    SelfConnection,

    #[error("Input '{port}' already has an incoming connection")]
    InputAlreadyConnected { port: String },

    #[error("Output '{port}' only allows one outgoing connection")]
    OutputAlreadyConnected { port: String },

    #[error("Cannot connect '{produced}' to an input accepting {accepted:?}")]
    IncompatibleConnection {
        produced: String,
        accepted: Vec<String>,
    },

    #[error("Node is locked: {0:?}")]
    NodeLocked(NodeId),
}

/// Errors raised while evaluating nodes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProcessError {
    /// An upstream node stopped the flow; nothing downstream of it may run.
    #[error("Evaluation halted at node '{node}'")]
    Halted { node: String },

    #[error("Cycle detected while evaluating node '{node}'")]
    Cycle { node: String },

    #[error("Node '{node}' failed: {message}")]
    Node { node: String, message: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
