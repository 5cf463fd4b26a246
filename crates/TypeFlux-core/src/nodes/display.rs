use super::{NodeMetadata, PortMetadata};
use crate::types::TypeTag;
use flow_graph::{InputSource, NodeOutput, ProcessError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INPUT: &str = "input";
pub const OUTPUT: &str = "output";

/// A consumer that accepts a declared set of kinds and passes its input through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNode {
    pub accepts: Vec<TypeTag>,
}

impl DisplayNode {
    pub fn new(accepts: impl IntoIterator<Item = impl Into<TypeTag>>) -> Self {
        Self {
            accepts: accepts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn metadata(&self) -> NodeMetadata {
        let accepts: Vec<&str> = self.accepts.iter().map(TypeTag::as_str).collect();
        let produced = match self.accepts.as_slice() {
            [only] => only.as_str(),
            _ => flow_graph::ALL_TYPE,
        };
        NodeMetadata {
            id: "display".to_string(),
            name: "Display".to_string(),
            category: "Data".to_string(),
            description: None,
            inputs: vec![PortMetadata::new(INPUT, &accepts)],
            outputs: vec![PortMetadata::new(OUTPUT, &[produced])],
            observes_connections: false,
        }
    }

    pub fn process(&self, inputs: &mut dyn InputSource) -> Result<NodeOutput, ProcessError> {
        let value = inputs.pull(INPUT)?.unwrap_or(Value::Null);
        Ok(NodeOutput::new().with(OUTPUT, value))
    }
}
