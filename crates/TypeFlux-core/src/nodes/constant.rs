use super::{NodeMetadata, PortMetadata};
use crate::types::TypeTag;
use flow_graph::NodeOutput;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const VALUE: &str = "value";

/// A producer with a fixed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantNode {
    pub value: Value,
    /// Declared kind of `value`. Inferred from the value when omitted.
    #[serde(default, rename = "type")]
    pub kind: Option<TypeTag>,
}

impl ConstantNode {
    pub fn new(value: Value) -> Self {
        Self { value, kind: None }
    }

    pub fn typed(value: Value, kind: impl Into<TypeTag>) -> Self {
        Self {
            value,
            kind: Some(kind.into()),
        }
    }

    pub fn kind(&self) -> TypeTag {
        self.kind
            .clone()
            .unwrap_or_else(|| TypeTag::infer(&self.value))
    }

    pub fn metadata(&self) -> NodeMetadata {
        NodeMetadata {
            id: "constant".to_string(),
            name: "Constant".to_string(),
            category: "Data".to_string(),
            description: None,
            inputs: vec![],
            outputs: vec![PortMetadata::new(VALUE, &[self.kind().as_str()])],
            observes_connections: false,
        }
    }

    pub fn process(&self) -> NodeOutput {
        NodeOutput::new().with(VALUE, self.value.clone())
    }
}
