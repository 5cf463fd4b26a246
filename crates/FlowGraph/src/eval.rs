//! # Lazy Evaluation
//!
//! A pull-based evaluator. Evaluating a node only runs the upstream producers
//! whose values it actually pulls, so a node can skip whole branches of the
//! graph by never asking for them.

use crate::error::{GraphError, ProcessError};
use crate::model::{GraphState, NodeData, NodeId};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// The values a node wrote to its output ports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeOutput {
    pub values: HashMap<String, Value>,
    /// The node stopped the flow. Nothing downstream of it may run.
    pub halted: bool,
}

impl NodeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn halted() -> Self {
        Self {
            values: HashMap::new(),
            halted: true,
        }
    }

    pub fn with(mut self, port: impl Into<String>, value: Value) -> Self {
        self.values.insert(port.into(), value);
        self
    }

    pub fn get(&self, port: &str) -> Option<&Value> {
        self.values.get(port)
    }
}

/// Handed to [`Process::process`] to read inputs on demand.
pub trait InputSource {
    /// Evaluates whatever feeds the named input and returns its value.
    ///
    /// Returns `Ok(None)` if the input is not connected or the producer wrote nothing.
    fn pull(&mut self, name: &str) -> Result<Option<Value>, ProcessError>;

    /// Whether the named input has an incoming connection.
    fn is_connected(&self, name: &str) -> bool;
}

/// Execution step of a node.
pub trait Process {
    fn process(&self, inputs: &mut dyn InputSource) -> Result<NodeOutput, ProcessError>;
}

/// Evaluates nodes of a graph, caching each node's output for the duration of a run.
pub struct Evaluator<'g, T> {
    graph: &'g GraphState<T>,
    cache: HashMap<NodeId, NodeOutput>,
    in_progress: HashSet<NodeId>,
    evaluated: Vec<NodeId>,
}

impl<'g, T: NodeData + Process> Evaluator<'g, T> {
    pub fn new(graph: &'g GraphState<T>) -> Self {
        Self {
            graph,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
            evaluated: Vec::new(),
        }
    }

    /// Evaluates `node`, pulling upstream values as it asks for them.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self, node: NodeId) -> Result<NodeOutput, ProcessError> {
        self.evaluate(node)
    }

    /// Nodes that actually executed, upstream producers before their consumers.
    pub fn evaluated(&self) -> &[NodeId] {
        &self.evaluated
    }

    pub fn was_evaluated(&self, node: NodeId) -> bool {
        self.cache.contains_key(&node)
    }

    fn evaluate(&mut self, node: NodeId) -> Result<NodeOutput, ProcessError> {
        if let Some(out) = self.cache.get(&node) {
            return Ok(out.clone());
        }

        let graph = self.graph;
        let entry = graph
            .nodes
            .get(node)
            .ok_or(GraphError::UnknownNode(node))?;

        if !self.in_progress.insert(node) {
            return Err(ProcessError::Cycle {
                node: entry.name.clone(),
            });
        }

        let result = {
            let mut inputs = NodeInputs {
                evaluator: self,
                node,
            };
            entry.data.process(&mut inputs)
        };
        self.in_progress.remove(&node);
        let out = result?;

        if out.halted {
            tracing::info!(node = %entry.name, "Node halted the flow");
        } else {
            tracing::debug!(node = %entry.name, "Node evaluated");
        }
        self.evaluated.push(node);
        self.cache.insert(node, out.clone());
        Ok(out)
    }
}

struct NodeInputs<'e, 'g, T> {
    evaluator: &'e mut Evaluator<'g, T>,
    node: NodeId,
}

impl<'e, 'g, T: NodeData + Process> InputSource for NodeInputs<'e, 'g, T> {
    fn pull(&mut self, name: &str) -> Result<Option<Value>, ProcessError> {
        let graph = self.evaluator.graph;
        let Some(port) = graph.find_port(self.node, name) else {
            return Ok(None);
        };
        let Some(conn) = graph.connections.values().find(|c| c.to == port) else {
            return Ok(None);
        };
        let source = graph
            .ports
            .get(conn.from)
            .ok_or(GraphError::UnknownPort(conn.from))?;

        let out = self.evaluator.evaluate(source.node)?;
        if out.halted {
            let producer = graph
                .nodes
                .get(source.node)
                .map(|n| n.name.clone())
                .unwrap_or_default();
            return Err(ProcessError::Halted { node: producer });
        }
        Ok(out.values.get(&source.name).cloned())
    }

    fn is_connected(&self, name: &str) -> bool {
        let graph = self.evaluator.graph;
        graph
            .find_port(self.node, name)
            .is_some_and(|port| graph.connections.values().any(|c| c.to == port))
    }
}
