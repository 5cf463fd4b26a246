use crate::error::EvaluationError;
use serde_json::Value;

/// Strings read as `false`. Compared after trimming and lower-casing.
const FALSEY_WORDS: &[&str] = &[
    "false", "falsey", "f", "no", "n", "negative", "off", "zero", "0.0", "0", "", "nope", "nah",
    "none", "null", "nyet", "nein", "disabled",
];

/// Coerces a condition value to a boolean.
///
/// Booleans pass through, integers are true when non-zero, and strings are
/// true unless they are one of the falsey words. Every other value is rejected.
pub fn evaluate_condition(value: &Value) -> Result<bool, EvaluationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i != 0)
            } else if let Some(u) = n.as_u64() {
                Ok(u != 0)
            } else {
                Err(unsupported("float"))
            }
        }
        Value::String(s) => {
            let lowered = s.trim().to_lowercase();
            Ok(!FALSEY_WORDS.contains(&lowered.as_str()))
        }
        Value::Null => Err(unsupported("null")),
        Value::Array(_) => Err(unsupported("list")),
        Value::Object(_) => Err(unsupported("dict")),
    }
}

fn unsupported(found: &str) -> EvaluationError {
    EvaluationError::UnevaluableCondition {
        found: found.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booleans_and_integers() {
        assert!(evaluate_condition(&json!(true)).unwrap());
        assert!(!evaluate_condition(&json!(false)).unwrap());
        assert!(evaluate_condition(&json!(3)).unwrap());
        assert!(evaluate_condition(&json!(-1)).unwrap());
        assert!(!evaluate_condition(&json!(0)).unwrap());
    }

    #[test]
    fn test_falsey_words() {
        for word in ["false", " NO ", "Nein", "off", "0", "0.0", "", "disabled", "null"] {
            assert!(!evaluate_condition(&json!(word)).unwrap(), "{word:?}");
        }
        for word in ["true", "yes", "1", "anything", "0.5"] {
            assert!(evaluate_condition(&json!(word)).unwrap(), "{word:?}");
        }
    }

    #[test]
    fn test_rejects_other_values() {
        assert_eq!(
            evaluate_condition(&json!(1.5)).unwrap_err(),
            EvaluationError::UnevaluableCondition {
                found: "float".into()
            }
        );
        assert!(evaluate_condition(&Value::Null).is_err());
        assert!(evaluate_condition(&json!([true])).is_err());
        assert!(evaluate_condition(&json!({"v": true})).is_err());
    }
}
