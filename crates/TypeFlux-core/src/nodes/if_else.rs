use super::{NodeMetadata, PortMetadata};
use crate::compat::CompatibilityTable;
use crate::condition::evaluate_condition;
use crate::config::TypeFluxConfig;
use crate::error::EvaluationError;
use crate::negotiation::{PortRole, PortTypes, TypeNegotiator};
use crate::types::TypeTag;
use flow_graph::{
    ConnectionEvent, ConnectionObserver, InputSource, NodeOutput, NodePorts, ProcessError,
};
use serde_json::Value;

pub const EVALUATE: &str = "evaluate";
pub const OUTPUT_IF_TRUE: &str = "output_if_true";
pub const OUTPUT_IF_FALSE: &str = "output_if_false";
pub const OUTPUT: &str = "output";
/// Output carrying the resolved condition.
pub const EVALUATION: &str = "evaluation";

/// Control output followed after evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlBranch {
    Then,
    Else,
}

impl ControlBranch {
    pub fn from_condition(condition: bool) -> Self {
        if condition { Self::Then } else { Self::Else }
    }

    /// The data input forwarded when this branch is taken.
    pub fn input_port(self) -> &'static str {
        match self {
            Self::Then => OUTPUT_IF_TRUE,
            Self::Else => OUTPUT_IF_FALSE,
        }
    }

    pub fn role(self) -> PortRole {
        match self {
            Self::Then => PortRole::InputA,
            Self::Else => PortRole::InputB,
        }
    }
}

/// Maps a port name to its negotiation role.
pub fn port_role(name: &str) -> Option<PortRole> {
    match name {
        OUTPUT_IF_TRUE => Some(PortRole::InputA),
        OUTPUT_IF_FALSE => Some(PortRole::InputB),
        OUTPUT => Some(PortRole::Output),
        _ => None,
    }
}

/// Conditional merge: forwards one of two inputs depending on `evaluate`.
///
/// The types of `output_if_true`, `output_if_false` and `output` follow the
/// connections around the node; see [`TypeNegotiator`].
#[derive(Debug, Clone)]
pub struct IfElseNode {
    negotiator: TypeNegotiator,
    /// Used when `evaluate` is not connected.
    condition: Value,
}

impl Default for IfElseNode {
    fn default() -> Self {
        Self::new(CompatibilityTable::default())
    }
}

impl IfElseNode {
    pub fn new(table: CompatibilityTable) -> Self {
        Self {
            negotiator: TypeNegotiator::new(table),
            condition: Value::Bool(false),
        }
    }

    pub fn from_config(config: &TypeFluxConfig) -> Self {
        Self::new(config.compatibility_groups.clone())
            .with_condition(Value::Bool(config.default_condition))
    }

    /// Sets the condition used while `evaluate` has no incoming connection.
    pub fn with_condition(mut self, condition: Value) -> Self {
        self.condition = condition;
        self
    }

    pub fn set_condition(&mut self, condition: Value) {
        self.condition = condition;
    }

    pub fn negotiator(&self) -> &TypeNegotiator {
        &self.negotiator
    }

    pub fn port_types(&self) -> &PortTypes {
        self.negotiator.port_types()
    }

    pub fn metadata() -> NodeMetadata {
        NodeMetadata {
            id: "if_else".to_string(),
            name: "If Else".to_string(),
            category: "Execution".to_string(),
            description: Some("Forwards one of two inputs based on a condition".to_string()),
            inputs: vec![
                PortMetadata::new(EVALUATE, &["bool", "int", "str"]),
                PortMetadata::new(OUTPUT_IF_TRUE, &["any"]),
                PortMetadata::new(OUTPUT_IF_FALSE, &["any"]),
            ],
            outputs: vec![
                PortMetadata::new(EVALUATION, &["bool"]),
                // At most one consumer.
                PortMetadata::new(OUTPUT, &["all"]).exclusive(),
            ],
            observes_connections: true,
        }
    }

    /// Resolves the condition and picks a branch. Only `evaluate` is pulled.
    pub fn select_branch(
        &self,
        inputs: &mut dyn InputSource,
    ) -> Result<ControlBranch, EvaluationError> {
        let value = if inputs.is_connected(EVALUATE) {
            match inputs.pull(EVALUATE) {
                Ok(Some(value)) => value,
                Ok(None) => {
                    return Err(EvaluationError::NoSelectablePath {
                        reason: "condition producer wrote no value".to_string(),
                    });
                }
                Err(e @ (ProcessError::Cycle { .. } | ProcessError::Graph(_))) => {
                    return Err(EvaluationError::Upstream(e));
                }
                Err(e) => {
                    return Err(EvaluationError::NoSelectablePath {
                        reason: e.to_string(),
                    });
                }
            }
        } else {
            self.condition.clone()
        };

        evaluate_condition(&value).map(ControlBranch::from_condition)
    }

    /// Evaluates the node, pulling the condition and then only the selected branch.
    ///
    /// An unresolvable condition halts the flow; a condition of the wrong
    /// kind fails the node. Cycles and graph errors upstream of `evaluate`
    /// are returned as they are.
    pub fn process(&self, inputs: &mut dyn InputSource) -> Result<NodeOutput, ProcessError> {
        let branch = match self.select_branch(inputs) {
            Ok(branch) => branch,
            Err(EvaluationError::NoSelectablePath { reason }) => {
                tracing::warn!(reason = %reason, "Condition unavailable, stopping flow");
                return Ok(NodeOutput::halted());
            }
            Err(e) => {
                tracing::error!(error = %e, "Condition evaluation failed");
                return Err(e.into_process_error("IfElse"));
            }
        };

        tracing::debug!(branch = ?branch, "Forwarding selected branch");
        let out = NodeOutput::new().with(EVALUATION, Value::Bool(branch == ControlBranch::Then));
        // An empty branch forwards nothing.
        Ok(match inputs.pull(branch.input_port())? {
            Some(selected) => out.with(OUTPUT, selected),
            None => out,
        })
    }

    /// The control output to follow after `output` was produced, if any.
    pub fn next_control_output(output: &NodeOutput) -> Option<ControlBranch> {
        if output.halted {
            return None;
        }
        output
            .get(EVALUATION)
            .and_then(Value::as_bool)
            .map(ControlBranch::from_condition)
    }

    fn publish(&self, ports: &mut NodePorts<'_>) {
        let types = self.negotiator.port_types();
        ports.set_accepted_types(OUTPUT_IF_TRUE, strings(&types.input_a.accepted));
        ports.set_accepted_types(OUTPUT_IF_FALSE, strings(&types.input_b.accepted));
        ports.set_produced_type(OUTPUT, Some(types.output.to_string()));
    }
}

impl ConnectionObserver for IfElseNode {
    fn on_connection_event(&mut self, event: &ConnectionEvent, ports: &mut NodePorts<'_>) {
        let role = port_role(event.port());
        match (event, role) {
            (ConnectionEvent::IncomingAdded { source, .. }, Some(role)) if role.is_input() => {
                let ty = source
                    .offered_type()
                    .map(TypeTag::new)
                    .unwrap_or_else(TypeTag::all);
                self.negotiator.on_incoming_connection_added(role, ty);
            }
            (ConnectionEvent::IncomingRemoved { .. }, Some(role)) if role.is_input() => {
                self.negotiator.on_incoming_connection_removed(role);
            }
            (ConnectionEvent::OutgoingAdded { target, .. }, Some(PortRole::Output)) => {
                let accepted = if target.accepted_types.is_empty() {
                    target.offered_type().into_iter().map(TypeTag::new).collect()
                } else {
                    target.accepted_types.iter().map(TypeTag::new).collect()
                };
                self.negotiator.on_outgoing_connection_added(accepted);
            }
            (ConnectionEvent::OutgoingRemoved { .. }, Some(PortRole::Output)) => {
                self.negotiator.on_outgoing_connection_removed();
            }
            _ => return,
        }
        self.publish(ports);
    }
}

fn strings(tags: &[TypeTag]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}
