//! Error types for evaluation, callables and planning.
//!
//! Evaluation errors never escape [`evaluate_program`](crate::eval::evaluate_program):
//! they are caught and rendered into the run state's result slot. Each
//! rendered message is prefixed with its [`ErrorKind`] so the result string
//! alone says what went wrong.

use std::fmt;

use planscript_core::{CoreError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::check::CheckIssue;

/// Broad classification of an evaluation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown variable, unknown callable or missing returned name.
    Lookup,
    /// Arguments or results failed to bind to a shape.
    Validation,
    /// A callable's own logic failed.
    Execution,
    /// A self-planned callable could not obtain a usable program.
    Planning,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Lookup => "lookup error",
            ErrorKind::Validation => "validation error",
            ErrorKind::Execution => "execution error",
            ErrorKind::Planning => "planning error",
        })
    }
}

/// Errors raised while evaluating expressions and statements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("lookup error: unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("lookup error: unknown callable '{name}'")]
    UnknownCallable { name: String },

    #[error("lookup error: callable name '{name}' is registered more than once")]
    DuplicateCallable { name: String },

    #[error("lookup error: '{returned}' was not returned by the right-hand side (available: {})", .available.join(", "))]
    MissingReturnedName {
        returned: String,
        available: Vec<String>,
    },

    #[error("lookup error: cannot read '{returned}' from a {actual} value")]
    NotARecord { returned: String, actual: String },

    #[error("validation error: arguments for '{callable}' rejected: {source}")]
    Validation {
        callable: String,
        source: ValidationError,
    },

    #[error("execution error: '{callable}' failed: {source}")]
    Execution {
        callable: String,
        source: CallableError,
    },
}

impl EvalError {
    /// Classifies the error.
    ///
    /// A nested self-planned callable that could not plan reports
    /// [`ErrorKind::Planning`] even though it surfaces as an execution
    /// failure of the enclosing invocation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::UnknownVariable { .. }
            | EvalError::UnknownCallable { .. }
            | EvalError::DuplicateCallable { .. }
            | EvalError::MissingReturnedName { .. }
            | EvalError::NotARecord { .. } => ErrorKind::Lookup,
            EvalError::Validation { .. } => ErrorKind::Validation,
            EvalError::Execution {
                source: CallableError::Planning(_),
                ..
            } => ErrorKind::Planning,
            EvalError::Execution { .. } => ErrorKind::Execution,
        }
    }
}

/// Errors raised by a callable's `execute`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallableError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("invalid output: {0}")]
    InvalidOutput(ValidationError),

    #[error("{message}")]
    Failed { message: String },

    #[error("planning error: {0}")]
    Planning(#[from] PlanningError),

    #[error("generated program failed: {message}")]
    ProgramFailed { message: String },

    #[error("invalid contract: {0}")]
    Contract(#[from] CoreError),
}

impl CallableError {
    pub fn failed(message: impl Into<String>) -> Self {
        CallableError::Failed {
            message: message.into(),
        }
    }
}

/// Errors raised while obtaining a program from a planner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    #[error("planner unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("planner response could not be parsed: {reason}")]
    InvalidResponse { reason: String },

    #[error("generated program is not well-typed: {}", render_issues(.issues))]
    InvalidProgram { issues: Vec<CheckIssue> },

    #[error("no usable program after {attempts} attempt(s); last error: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<PlanningError>,
    },

    #[error("invalid planning request: {0}")]
    Contract(#[from] CoreError),
}

fn render_issues(issues: &[CheckIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
