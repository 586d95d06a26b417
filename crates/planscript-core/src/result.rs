//! Terminal outcome of a program evaluation.

use serde::{Deserialize, Serialize};

use crate::value::ValueMap;

/// The result slot of a run: exactly one of `Ok` or `Error`.
///
/// `Error` carries a diagnostic string, not a structured cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result_type", rename_all = "snake_case")]
pub enum ProgramResult {
    /// The values returned by the program.
    Ok { values: ValueMap },
    /// The error message.
    Error { error: String },
}

impl ProgramResult {
    pub fn ok(values: ValueMap) -> Self {
        ProgramResult::Ok { values }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ProgramResult::Error {
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ProgramResult::Ok { .. })
    }

    pub fn values(&self) -> Option<&ValueMap> {
        match self {
            ProgramResult::Ok { values } => Some(values),
            ProgramResult::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ProgramResult::Ok { .. } => None,
            ProgramResult::Error { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn tagged_serialization() {
        let ok = ProgramResult::ok(ValueMap::from([("c".to_string(), Value::from(3))]));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"result_type": "ok", "values": {"c": 3}})
        );

        let err = ProgramResult::error("lookup error: unknown variable 'q'");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"result_type": "error", "error": "lookup error: unknown variable 'q'"})
        );
        assert_eq!(err.error_message(), Some("lookup error: unknown variable 'q'"));
        assert!(err.values().is_none());
    }
}
