//! Expression and statement nodes of the planscript language.
//!
//! The language is deliberately small: a [`Program`] is an ordered list of
//! [`AssignmentStatement`]s followed by exactly one [`ReturnStatement`].
//! Right-hand sides are [`Expression`]s: variable references, literals, or
//! invocations of named callables with expression arguments. There are no
//! loops, conditionals or nested scopes.
//!
//! Nodes here are plain data. Evaluation lives in `planscript-eval`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::value::Value;

/// An evaluable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr_type", rename_all = "snake_case")]
pub enum Expression {
    /// Reads a variable from the current scope.
    Variable { name: String },
    /// A constant value.
    Literal { value: Value },
    /// Calls a named callable with expression arguments.
    Invocation(Invocation),
}

/// A call of a named callable. Each argument is itself an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub name: String,
    pub arguments: IndexMap<String, Expression>,
}

impl Expression {
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable { name: name.into() }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal {
            value: value.into(),
        }
    }

    pub fn invoke<K, I>(name: impl Into<String>, arguments: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Expression)>,
    {
        Expression::Invocation(Invocation::new(name, arguments))
    }
}

impl Invocation {
    pub fn new<K, I>(name: impl Into<String>, arguments: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Expression)>,
    {
        Invocation {
            name: name.into(),
            arguments: arguments.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Binds names returned by the right-hand side into the current scope.
///
/// `assignments` maps a local variable name to the name under which the
/// right-hand side returned the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStatement {
    pub assignments: IndexMap<String, String>,
    pub rhs_expression: Expression,
}

impl AssignmentStatement {
    pub fn new<L, R, I>(assignments: I, rhs_expression: Expression) -> Self
    where
        L: Into<String>,
        R: Into<String>,
        I: IntoIterator<Item = (L, R)>,
    {
        AssignmentStatement {
            assignments: assignments
                .into_iter()
                .map(|(l, r)| (l.into(), r.into()))
                .collect(),
            rhs_expression,
        }
    }
}

/// Terminates the program with named result values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub return_values: IndexMap<String, Expression>,
}

impl ReturnStatement {
    pub fn new<K, I>(return_values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Expression)>,
    {
        ReturnStatement {
            return_values: return_values
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        }
    }
}

/// An executable node. Assignment is non-terminal, Return is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt_type", rename_all = "snake_case")]
pub enum Statement {
    Assignment(AssignmentStatement),
    Return(ReturnStatement),
}

impl Statement {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Statement::Return(_))
    }
}

/// Ordered assignments plus exactly one terminal return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<AssignmentStatement>,
    pub return_statement: ReturnStatement,
}

impl Program {
    pub fn new(statements: Vec<AssignmentStatement>, return_statement: ReturnStatement) -> Self {
        Program {
            statements,
            return_statement,
        }
    }

    /// Visits every invocation in the program, including invocations nested
    /// inside other invocations' arguments, in source order.
    pub fn invocations(&self) -> Vec<&Invocation> {
        let mut out = Vec::new();
        for statement in &self.statements {
            collect_invocations(&statement.rhs_expression, &mut out);
        }
        for expr in self.return_statement.return_values.values() {
            collect_invocations(expr, &mut out);
        }
        out
    }
}

fn collect_invocations<'a>(expr: &'a Expression, out: &mut Vec<&'a Invocation>) {
    if let Expression::Invocation(invocation) = expr {
        out.push(invocation);
        for arg in invocation.arguments.values() {
            collect_invocations(arg, out);
        }
    }
}

// Display renders the surface syntax used in logs and planner prompts.

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Variable { name } => f.write_str(name),
            Expression::Literal { value } => write!(f, "{}", value),
            Expression::Invocation(invocation) => write!(f, "{}", invocation),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (name, arg)) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, arg)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for AssignmentStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets = self
            .assignments
            .iter()
            .map(|(local, returned)| {
                if local == returned {
                    local.clone()
                } else {
                    format!("{}={}", local, returned)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} <- {}", targets, self.rhs_expression)
    }
}

impl fmt::Display for ReturnStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("return ")?;
        for (i, (name, expr)) in self.return_values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, expr)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assignment(s) => write!(f, "{}", s),
            Statement::Return(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        write!(f, "\n{}", self.return_statement)
    }
}

/// JSON Schema definitions for [`Expression`], referenced as
/// `#/$defs/Expression` by expression-typed slots.
pub fn expression_schema_defs() -> serde_json::Value {
    json!({
        "Expression": {
            "oneOf": [
                { "$ref": "#/$defs/VariableExpr" },
                { "$ref": "#/$defs/LiteralExpr" },
                { "$ref": "#/$defs/InvocationExpr" }
            ],
            "discriminator": { "propertyName": "expr_type" }
        },
        "VariableExpr": {
            "type": "object",
            "properties": {
                "expr_type": { "const": "variable" },
                "name": { "type": "string", "description": "The name of the variable" }
            },
            "required": ["expr_type", "name"],
            "additionalProperties": false
        },
        "LiteralExpr": {
            "type": "object",
            "properties": {
                "expr_type": { "const": "literal" },
                "value": {
                    "type": ["string", "number", "boolean"],
                    "description": "The literal value"
                }
            },
            "required": ["expr_type", "value"],
            "additionalProperties": false
        },
        "InvocationExpr": {
            "type": "object",
            "properties": {
                "expr_type": { "const": "invocation" },
                "name": { "type": "string", "description": "The callable to invoke" },
                "arguments": {
                    "type": "object",
                    "additionalProperties": { "$ref": "#/$defs/Expression" },
                    "description": "Argument name to the expression producing its value"
                }
            },
            "required": ["expr_type", "name", "arguments"],
            "additionalProperties": false
        }
    })
}
