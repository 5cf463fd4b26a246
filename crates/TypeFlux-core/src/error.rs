use flow_graph::ProcessError;
use thiserror::Error;

/// Failures of a node's evaluation step. Negotiation itself never fails.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    /// The condition holds a value that is not boolean-like.
    #[error("Unsupported type for evaluate: {found}")]
    UnevaluableCondition { found: String },

    /// The condition could not be produced at all.
    #[error("No branch can be selected: {reason}")]
    NoSelectablePath { reason: String },

    /// Evaluating the condition's producer failed structurally.
    #[error(transparent)]
    Upstream(ProcessError),
}

impl EvaluationError {
    /// Wraps the error for the graph evaluator, attributing it to `node`.
    pub fn into_process_error(self, node: &str) -> ProcessError {
        match self {
            Self::Upstream(e) => e,
            other => ProcessError::Node {
                node: node.to_string(),
                message: other.to_string(),
            },
        }
    }
}
