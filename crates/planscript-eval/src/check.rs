//! Static checking of generated programs.
//!
//! [`check_program`] verifies a program against a [`PlanningRequest`]
//! before it is cached or run: every invocation names an offered tool and
//! satisfies its template, every variable is bound before use, assignments
//! only project names the tool returns, argument and return types agree
//! where they are statically known, and the return statement produces
//! exactly the expected outputs. All issues are collected.

use std::collections::HashMap;

use planscript_core::{DataType, Expression, Invocation, Program, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::planner::{PlanningRequest, ToolSpec};

/// One problem found in a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckIssue {
    #[error("{location}: unknown callable '{name}'")]
    UnknownCallable { location: String, name: String },

    #[error("{location}: variable '{name}' is not defined at this point")]
    UndefinedVariable { location: String, name: String },

    #[error("{location}: invalid arguments for '{callable}': {message}")]
    InvalidArguments {
        location: String,
        callable: String,
        message: String,
    },

    #[error("{location}: '{callable}' does not return '{returned}'")]
    UnknownReturnedName {
        location: String,
        callable: String,
        returned: String,
    },

    #[error("{location}: the right-hand side of an assignment must be an invocation")]
    NonInvocationAssignment { location: String },

    #[error("{location}: an invocation result cannot be used as a value")]
    InvocationAsValue { location: String },

    #[error("{location}: expected {expected}, got {actual}")]
    TypeMismatch {
        location: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("return is missing output '{name}'")]
    MissingOutput { name: String },

    #[error("return produces unexpected output '{name}'")]
    UnexpectedOutput { name: String },

    #[error("callable '{name}' is offered more than once")]
    DuplicateTool { name: String },
}

/// Checks `program` against `request`, returning every issue found.
pub fn check_program(program: &Program, request: &PlanningRequest) -> Result<(), Vec<CheckIssue>> {
    let mut checker = Checker::new(request);

    for (index, statement) in program.statements.iter().enumerate() {
        let location = format!("statement {}", index + 1);
        match &statement.rhs_expression {
            Expression::Invocation(invocation) => {
                let tool = checker.invocation(invocation, &location);
                for (local, returned) in &statement.assignments {
                    let dtype = match tool {
                        Some(tool) => match tool.definition.returns.get(returned) {
                            Some(slot) => Some(slot.dtype.clone()),
                            None => {
                                checker.issues.push(CheckIssue::UnknownReturnedName {
                                    location: location.clone(),
                                    callable: invocation.name.clone(),
                                    returned: returned.clone(),
                                });
                                None
                            }
                        },
                        None => None,
                    };
                    checker.scope.insert(local.clone(), dtype);
                }
            }
            other => {
                checker.value(other, &location);
                checker
                    .issues
                    .push(CheckIssue::NonInvocationAssignment { location });
                for local in statement.assignments.keys() {
                    checker.scope.insert(local.clone(), None);
                }
            }
        }
    }

    let outputs = &request.outputs;
    for (name, expr) in &program.return_statement.return_values {
        let actual = checker.value(expr, &format!("return value '{}'", name));
        let expected = outputs.slot_type(name);
        if expected.is_none() {
            checker
                .issues
                .push(CheckIssue::UnexpectedOutput { name: name.clone() });
        }
        checker.compare(expected, actual, format!("return value '{}'", name));
    }
    for name in outputs.placeholders.keys() {
        if !program.return_statement.return_values.contains_key(name) {
            checker
                .issues
                .push(CheckIssue::MissingOutput { name: name.clone() });
        }
    }

    if checker.issues.is_empty() {
        Ok(())
    } else {
        Err(checker.issues)
    }
}

struct Checker<'r> {
    tools: HashMap<&'r str, &'r ToolSpec>,
    /// Bound names and their type, when statically known.
    scope: HashMap<String, Option<DataType>>,
    /// Type of unlisted input names, if the inputs accept extras.
    open_inputs: Option<DataType>,
    issues: Vec<CheckIssue>,
}

impl<'r> Checker<'r> {
    fn new(request: &'r PlanningRequest) -> Self {
        let mut issues = Vec::new();
        let mut tools = HashMap::with_capacity(request.tools.len());
        for tool in &request.tools {
            let name = tool.definition.name.as_str();
            if tools.insert(name, tool).is_some() {
                issues.push(CheckIssue::DuplicateTool {
                    name: name.to_string(),
                });
            }
        }
        let scope = request
            .inputs
            .placeholders
            .iter()
            .map(|(name, slot)| (name.clone(), Some(slot.dtype.clone())))
            .collect();
        Checker {
            tools,
            scope,
            open_inputs: request.inputs.extras.as_ref().map(|e| e.dtype.clone()),
            issues,
        }
    }

    /// Checks an invocation and returns the tool it names, if offered.
    fn invocation(&mut self, invocation: &Invocation, location: &str) -> Option<&'r ToolSpec> {
        let Some(tool) = self.tools.get(invocation.name.as_str()).copied() else {
            self.issues.push(CheckIssue::UnknownCallable {
                location: location.to_string(),
                name: invocation.name.clone(),
            });
            for (name, arg) in &invocation.arguments {
                self.value(arg, &format!("{}, argument '{}'", location, name));
            }
            return None;
        };

        if let Err(err) = tool.template.validate_invocation(invocation) {
            self.issues.push(CheckIssue::InvalidArguments {
                location: location.to_string(),
                callable: invocation.name.clone(),
                message: err.to_string(),
            });
        }

        for (name, arg) in &invocation.arguments {
            let arg_location = format!("{}, argument '{}'", location, name);
            let actual = self.value(arg, &arg_location);
            let expected = tool.parameters.slot_type(name);
            self.compare(expected, actual, arg_location);
        }
        Some(tool)
    }

    /// Checks an expression used as a value and returns its type if known.
    fn value(&mut self, expr: &Expression, location: &str) -> Option<DataType> {
        match expr {
            Expression::Variable { name } => match self.scope.get(name) {
                Some(dtype) => dtype.clone(),
                None => match &self.open_inputs {
                    Some(dtype) => Some(dtype.clone()),
                    None => {
                        self.issues.push(CheckIssue::UndefinedVariable {
                            location: location.to_string(),
                            name: name.clone(),
                        });
                        None
                    }
                },
            },
            Expression::Literal { value } => literal_type(value),
            Expression::Invocation(invocation) => {
                self.invocation(invocation, location);
                self.issues.push(CheckIssue::InvocationAsValue {
                    location: location.to_string(),
                });
                None
            }
        }
    }

    fn compare(&mut self, expected: Option<&DataType>, actual: Option<DataType>, location: String) {
        if let (Some(expected), Some(actual)) = (expected, actual) {
            if *expected != actual && *expected != DataType::Expression {
                self.issues.push(CheckIssue::TypeMismatch {
                    location,
                    expected: expected.clone(),
                    actual,
                });
            }
        }
    }
}

fn literal_type(value: &Value) -> Option<DataType> {
    match value {
        Value::Text(_) => Some(DataType::Text),
        Value::Number(_) => Some(DataType::Decimal),
        Value::Bool(_) => Some(DataType::Bool),
        Value::Record(_) => None,
    }
}
