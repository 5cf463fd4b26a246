use flow_graph::model::NodeData;
use flow_graph::{
    ConnectionEvent, ConnectionObserver, FlowGraph, GraphError, InputSource, NodeId, NodeOutput,
    NodePorts, Process, ProcessError,
};
use serde::{Deserialize, Serialize};

pub mod constant;
pub mod display;
pub mod if_else;

pub use constant::ConstantNode;
pub use display::DisplayNode;
pub use if_else::{ControlBranch, IfElseNode};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortMetadata {
    pub name: String,
    /// Accepted types for inputs; the first entry is the produced type for outputs.
    pub data_types: Vec<String>,
    /// Output limited to a single outgoing connection.
    #[serde(default)]
    pub exclusive: bool,
}

impl PortMetadata {
    pub fn new(name: &str, data_types: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            data_types: data_types.iter().map(|t| t.to_string()).collect(),
            exclusive: false,
        }
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub inputs: Vec<PortMetadata>,
    pub outputs: Vec<PortMetadata>,
    /// Whether the node must be subscribed to connection events.
    pub observes_connections: bool,
}

/// The node kinds shipped with this crate.
#[derive(Debug, Clone)]
pub enum StandardNode {
    IfElse(IfElseNode),
    Constant(ConstantNode),
    Display(DisplayNode),
}

impl StandardNode {
    pub fn metadata(&self) -> NodeMetadata {
        match self {
            Self::IfElse(_) => IfElseNode::metadata(),
            Self::Constant(n) => n.metadata(),
            Self::Display(n) => n.metadata(),
        }
    }

    pub fn as_if_else(&self) -> Option<&IfElseNode> {
        match self {
            Self::IfElse(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_if_else_mut(&mut self) -> Option<&mut IfElseNode> {
        match self {
            Self::IfElse(n) => Some(n),
            _ => None,
        }
    }
}

impl From<IfElseNode> for StandardNode {
    fn from(n: IfElseNode) -> Self {
        Self::IfElse(n)
    }
}

impl From<ConstantNode> for StandardNode {
    fn from(n: ConstantNode) -> Self {
        Self::Constant(n)
    }
}

impl From<DisplayNode> for StandardNode {
    fn from(n: DisplayNode) -> Self {
        Self::Display(n)
    }
}

impl NodeData for StandardNode {
    fn node_type(&self) -> String {
        self.metadata().id
    }
}

impl ConnectionObserver for StandardNode {
    fn on_connection_event(&mut self, event: &ConnectionEvent, ports: &mut NodePorts<'_>) {
        if let Self::IfElse(n) = self {
            n.on_connection_event(event, ports);
        }
    }
}

impl Process for StandardNode {
    fn process(&self, inputs: &mut dyn InputSource) -> Result<NodeOutput, ProcessError> {
        match self {
            Self::IfElse(n) => n.process(inputs),
            Self::Constant(n) => Ok(n.process()),
            Self::Display(n) => n.process(inputs),
        }
    }
}

/// Adds `node` to `graph`, creating the ports its metadata declares and
/// subscribing it to connection events when it needs them.
#[tracing::instrument(skip(graph, node), fields(name = %name))]
pub fn spawn(
    graph: &mut FlowGraph<StandardNode>,
    name: &str,
    node: impl Into<StandardNode>,
) -> Result<NodeId, GraphError> {
    let node = node.into();
    let meta = node.metadata();
    let id = graph.add_node(name, node);

    for port in meta.inputs {
        graph.add_input(id, port.name, port.data_types)?;
    }
    for port in meta.outputs {
        let exclusive = port.exclusive;
        let port_id = graph.add_output(id, port.name, port.data_types.into_iter().next())?;
        if exclusive {
            graph.set_exclusive(port_id, true)?;
        }
    }
    if meta.observes_connections {
        graph.subscribe(id)?;
    }
    Ok(id)
}
