//! Core error types for planscript-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of the data model: type resolution, value conversion,
//! shape binding and invocation-template validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dtype::DataType;

/// Core errors produced by the planscript-core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Attempting to register a type alias that already exists in the registry.
    #[error("duplicate type alias: '{name}'")]
    DuplicateAlias { name: String },

    /// A declared type name never resolved to a concrete kind.
    #[error("unknown type: '{name}' does not name a supported data type")]
    UnknownType { name: String },

    /// A JSON value has no runtime [`Value`](crate::value::Value) counterpart.
    #[error("unsupported value: {reason}")]
    UnsupportedValue { reason: String },
}

/// One reason a value map does not conform to a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A declared field has no value.
    Missing { field: String },
    /// A value was supplied under a name the shape does not accept.
    Unexpected { field: String },
    /// A value does not conform to the declared type of its slot.
    WrongType {
        field: String,
        expected: DataType,
        actual: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Missing { field } => write!(f, "'{}': field required", field),
            Violation::Unexpected { field } => {
                write!(f, "'{}': extra fields not permitted", field)
            }
            Violation::WrongType {
                field,
                expected,
                actual,
            } => write!(f, "'{}': expected {}, got {}", field, expected, actual),
        }
    }
}

/// A value map failed to bind to a shape.
///
/// Carries every violation found, not just the first, so that a planner or
/// caller can repair all of them at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error(
    "{} validation error(s) for {shape}: {}",
    .violations.len(),
    render_violations(.violations)
)]
pub struct ValidationError {
    /// Name of the shape the values were bound against.
    pub shape: String,
    /// Every violation, in field order.
    pub violations: Vec<Violation>,
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A candidate invocation failed to validate against an invocation template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    /// The candidate is not a JSON object, or `arguments` is not an object.
    #[error("malformed invocation for '{callable}': {reason}")]
    Malformed { callable: String, reason: String },

    /// The candidate names a different callable than the template is fixed to.
    #[error("invocation names '{actual}' but the template only accepts '{expected}'")]
    WrongCallable { expected: String, actual: String },

    /// An argument value is not a well-formed expression.
    #[error("argument '{argument}' of '{callable}' is not a valid expression: {reason}")]
    InvalidExpression {
        callable: String,
        argument: String,
        reason: String,
    },

    /// The argument names or kinds do not fit the template's argument shape.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
