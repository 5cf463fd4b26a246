use flow_graph::{ALL_TYPE, ANY_TYPE};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque name of a data kind (e.g. `"str"`, `"int"`, `"ImageArtifact"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Input-side sentinel: accepts anything.
    pub fn any() -> Self {
        Self(ANY_TYPE.to_string())
    }

    /// Output-side sentinel: may produce anything.
    pub fn all() -> Self {
        Self(ALL_TYPE.to_string())
    }

    pub fn is_universal(&self) -> bool {
        self.0 == ANY_TYPE || self.0 == ALL_TYPE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Infers the kind of a runtime value.
    ///
    /// Strings are inspected for what they encode: JSON documents, booleans
    /// and numbers report the kind they parse as, anything else is `str`.
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::infer_str(s),
            other => Self::of_json(other),
        }
    }

    fn infer_str(s: &str) -> Self {
        // Checked first: JSON reads integers past i64/u64 as floats.
        if is_integer_literal(s.trim()) {
            return Self::new("int");
        }
        if let Ok(parsed) = serde_json::from_str::<Value>(s) {
            return Self::of_json(&parsed);
        }
        if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
            return Self::new("bool");
        }
        let trimmed = s.trim();
        if trimmed.parse::<i64>().is_ok() {
            return Self::new("int");
        }
        if trimmed.parse::<f64>().is_ok() {
            return Self::new("float");
        }
        Self::new("str")
    }

    fn of_json(value: &Value) -> Self {
        let name = match value {
            Value::Null => "none",
            Value::Bool(_) => "bool",
            Value::Number(n) if n.is_f64() => "float",
            Value::Number(_) => "int",
            Value::String(_) => "str",
            Value::Array(_) => "list",
            Value::Object(_) => "dict",
        };
        Self::new(name)
    }
}

/// Optional sign followed by at least one ASCII digit, of any length.
fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.0
    }
}

impl AsRef<str> for TypeTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
