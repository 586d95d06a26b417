//! Invocation templates: the per-callable schema a planner must satisfy.
//!
//! A template fixes the callable name and describes the argument map, in
//! which every value must be an [`Expression`] rather than a concrete value.
//! Validating planner output against the template is what keeps generated
//! programs well-typed: required arguments present, no unknown arguments
//! unless the callable accepts extras, and every argument a well-formed
//! expression.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ast::{self, Expression, Invocation};
use crate::dtype::DataType;
use crate::error::{TemplateError, ValidationError, Violation};
use crate::shape::{ExtraFields, ShapeDescriptor};
use crate::value::Value;

/// The constrained invocation schema derived from a callable's parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationTemplate {
    /// The only callable name this template accepts.
    pub callable_name: String,
    pub description: String,
    /// Argument shape; expression-typed for templates built by the bridge.
    pub arguments: ShapeDescriptor,
}

impl InvocationTemplate {
    /// Validates a candidate invocation given as JSON and returns it typed.
    ///
    /// The candidate is an object with an `arguments` object and an optional
    /// `name` (defaulting to the fixed callable name). An `expr_type` of
    /// `"invocation"` is tolerated so that invocation expressions validate
    /// as-is.
    pub fn validate_json(&self, candidate: &serde_json::Value) -> Result<Invocation, TemplateError> {
        let object = candidate
            .as_object()
            .ok_or_else(|| self.malformed("expected a JSON object"))?;

        for key in object.keys() {
            match key.as_str() {
                "name" | "arguments" => {}
                "expr_type" if object[key] == json!("invocation") => {}
                other => return Err(self.malformed(&format!("unexpected key '{}'", other))),
            }
        }

        if let Some(name) = object.get("name") {
            let name = name
                .as_str()
                .ok_or_else(|| self.malformed("'name' must be a string"))?;
            if name != self.callable_name {
                return Err(TemplateError::WrongCallable {
                    expected: self.callable_name.clone(),
                    actual: name.to_string(),
                });
            }
        }

        let arguments = object
            .get("arguments")
            .ok_or_else(|| self.malformed("missing 'arguments'"))?
            .as_object()
            .ok_or_else(|| self.malformed("'arguments' must be an object"))?;

        let mut violations = Vec::new();
        let mut parsed: IndexMap<String, Expression> = IndexMap::with_capacity(arguments.len());
        for (name, raw) in arguments {
            let Some(dtype) = self.slot_type(name) else {
                violations.push(Violation::Unexpected {
                    field: name.clone(),
                });
                continue;
            };
            match self.parse_argument(name, dtype, raw)? {
                Ok(expr) => {
                    parsed.insert(name.clone(), expr);
                }
                Err(violation) => violations.push(violation),
            }
        }
        violations.extend(self.missing(|field| arguments.contains_key(field)));

        if !violations.is_empty() {
            return Err(self.invalid(violations));
        }

        Ok(Invocation {
            name: self.callable_name.clone(),
            arguments: self.declared_order(parsed),
        })
    }

    /// Validates an already-typed invocation.
    ///
    /// Expression slots accept any expression; concrete slots accept only a
    /// literal of the declared kind.
    pub fn validate_invocation(&self, invocation: &Invocation) -> Result<(), TemplateError> {
        if invocation.name != self.callable_name {
            return Err(TemplateError::WrongCallable {
                expected: self.callable_name.clone(),
                actual: invocation.name.clone(),
            });
        }

        let mut violations = Vec::new();
        for (name, expr) in &invocation.arguments {
            match self.slot_type(name) {
                None => violations.push(Violation::Unexpected {
                    field: name.clone(),
                }),
                Some(DataType::Expression) => {}
                Some(dtype) => match expr {
                    Expression::Literal { value } if dtype.accepts(value) => {}
                    Expression::Literal { value } => violations.push(Violation::WrongType {
                        field: name.clone(),
                        expected: dtype.clone(),
                        actual: value.type_name().to_string(),
                    }),
                    _ => violations.push(Violation::WrongType {
                        field: name.clone(),
                        expected: dtype.clone(),
                        actual: "expression".to_string(),
                    }),
                },
            }
        }
        violations.extend(self.missing(|field| invocation.arguments.contains_key(field)));

        if violations.is_empty() {
            Ok(())
        } else {
            Err(self.invalid(violations))
        }
    }

    /// JSON Schema for the template: a fixed `name` and the argument shape,
    /// with the shared expression definitions hoisted to the top level.
    pub fn to_json_schema(&self) -> Result<serde_json::Value, crate::error::CoreError> {
        let mut arguments = self.arguments.to_json_schema()?;
        if let Some(object) = arguments.as_object_mut() {
            object.remove("$defs");
        }
        let mut schema = json!({
            "title": format!("{}_invocation", self.callable_name),
            "type": "object",
            "properties": {
                "name": { "const": self.callable_name },
                "arguments": arguments,
            },
            "required": ["arguments"],
            "additionalProperties": false,
            "$defs": ast::expression_schema_defs(),
        });
        if !self.description.is_empty() {
            schema["description"] = json!(self.description);
        }
        Ok(schema)
    }

    fn slot_type(&self, name: &str) -> Option<&DataType> {
        match self.arguments.fields.get(name) {
            Some(field) => Some(&field.dtype),
            None => match &self.arguments.extra {
                ExtraFields::Allow { dtype, .. } => Some(dtype),
                ExtraFields::Forbid => None,
            },
        }
    }

    /// Parses one raw argument. The outer error aborts validation (the
    /// argument is not an expression at all); the inner one is a collected
    /// violation.
    fn parse_argument(
        &self,
        name: &str,
        dtype: &DataType,
        raw: &serde_json::Value,
    ) -> Result<Result<Expression, Violation>, TemplateError> {
        if *dtype == DataType::Expression {
            return serde_json::from_value::<Expression>(raw.clone())
                .map(Ok)
                .map_err(|e| TemplateError::InvalidExpression {
                    callable: self.callable_name.clone(),
                    argument: name.to_string(),
                    reason: e.to_string(),
                });
        }

        let wrong = |actual: &str| Violation::WrongType {
            field: name.to_string(),
            expected: dtype.clone(),
            actual: actual.to_string(),
        };
        Ok(match Value::from_json(raw) {
            Ok(value) if dtype.accepts(&value) => Ok(Expression::Literal { value }),
            Ok(value) => Err(wrong(value.type_name())),
            Err(_) => Err(wrong("unsupported")),
        })
    }

    fn missing<'a>(&'a self, present: impl Fn(&str) -> bool + 'a) -> impl Iterator<Item = Violation> + 'a {
        self.arguments
            .fields
            .keys()
            .filter(move |field| !present(field.as_str()))
            .map(|field| Violation::Missing {
                field: field.clone(),
            })
    }

    fn declared_order(&self, mut parsed: IndexMap<String, Expression>) -> IndexMap<String, Expression> {
        let mut ordered = IndexMap::with_capacity(parsed.len());
        for field in self.arguments.fields.keys() {
            if let Some(expr) = parsed.shift_remove(field) {
                ordered.insert(field.clone(), expr);
            }
        }
        ordered.extend(parsed);
        ordered
    }

    fn malformed(&self, reason: &str) -> TemplateError {
        TemplateError::Malformed {
            callable: self.callable_name.clone(),
            reason: reason.to_string(),
        }
    }

    fn invalid(&self, violations: Vec<Violation>) -> TemplateError {
        TemplateError::Validation(ValidationError {
            shape: self.arguments.name.clone(),
            violations,
        })
    }
}
