//! Explicit shape descriptors for structured inputs and outputs.
//!
//! A [`ShapeDescriptor`] names a structured type, lists its fields (name,
//! declared type, documentation) and states whether additional fields of a
//! uniform type are accepted. Callables describe their inputs and outputs
//! with descriptors; the [`bridge`](crate::bridge) converts between
//! descriptors and placeholder contracts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ast;
use crate::dtype::{DataType, DtypeRegistry};
use crate::error::{CoreError, ValidationError, Violation};
use crate::value::{Value, ValueMap};

/// One declared field of a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub dtype: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Policy for names beyond the declared fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ExtraFields {
    /// Unknown names are rejected.
    #[default]
    Forbid,
    /// Any additional name is accepted if its value conforms to `dtype`.
    Allow {
        dtype: DataType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// A structured input/output shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Declared fields in declaration order. All are required.
    pub fields: IndexMap<String, FieldDescriptor>,
    #[serde(default)]
    pub extra: ExtraFields,
}

impl ShapeDescriptor {
    pub fn builder(name: impl Into<String>) -> ShapeBuilder {
        ShapeBuilder {
            shape: ShapeDescriptor {
                name: name.into(),
                description: String::new(),
                fields: IndexMap::new(),
                extra: ExtraFields::Forbid,
            },
        }
    }

    pub fn allows_extra(&self) -> bool {
        matches!(self.extra, ExtraFields::Allow { .. })
    }

    /// Binds a value map to this shape.
    ///
    /// Enforces required fields, the extras policy and declared kinds,
    /// collecting every violation. The bound map lists declared fields in
    /// declaration order followed by accepted extras in input order.
    pub fn bind(&self, mut values: ValueMap) -> Result<ValueMap, ValidationError> {
        let mut violations = Vec::new();
        let mut bound = ValueMap::with_capacity(values.len());

        for (name, field) in &self.fields {
            match values.shift_remove(name) {
                Some(value) => {
                    if field.dtype.accepts(&value) {
                        bound.insert(name.clone(), value);
                    } else {
                        violations.push(wrong_type(name, &field.dtype, &value));
                    }
                }
                None => violations.push(Violation::Missing {
                    field: name.clone(),
                }),
            }
        }

        for (name, value) in values {
            match &self.extra {
                ExtraFields::Forbid => violations.push(Violation::Unexpected { field: name }),
                ExtraFields::Allow { dtype, .. } => {
                    if dtype.accepts(&value) {
                        bound.insert(name, value);
                    } else {
                        violations.push(wrong_type(&name, dtype, &value));
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(bound)
        } else {
            Err(ValidationError {
                shape: self.name.clone(),
                violations,
            })
        }
    }

    /// Shape equivalence: same name, same fields with the same types and
    /// documentation (absent and empty documentation are the same), and the
    /// same extras policy and type. Shape-level descriptions are ignored.
    pub fn is_equivalent(&self, other: &ShapeDescriptor) -> bool {
        if self.name != other.name || self.fields.len() != other.fields.len() {
            return false;
        }
        let fields_match = self.fields.iter().all(|(name, field)| {
            other.fields.get(name).is_some_and(|o| {
                o.dtype == field.dtype && doc(&o.description) == doc(&field.description)
            })
        });
        let extras_match = match (&self.extra, &other.extra) {
            (ExtraFields::Forbid, ExtraFields::Forbid) => true,
            (
                ExtraFields::Allow { dtype: a, description: da },
                ExtraFields::Allow { dtype: b, description: db },
            ) => a == b && doc(da) == doc(db),
            _ => false,
        };
        fields_match && extras_match
    }

    /// Copy with every unresolved field and extras type re-resolved through
    /// `registry`.
    pub fn resolve_in(&self, registry: &DtypeRegistry) -> ShapeDescriptor {
        let fields = self
            .fields
            .iter()
            .map(|(name, field)| {
                (
                    name.clone(),
                    FieldDescriptor {
                        dtype: registry.rebind(&field.dtype),
                        description: field.description.clone(),
                    },
                )
            })
            .collect();
        let extra = match &self.extra {
            ExtraFields::Forbid => ExtraFields::Forbid,
            ExtraFields::Allow { dtype, description } => ExtraFields::Allow {
                dtype: registry.rebind(dtype),
                description: description.clone(),
            },
        };
        ShapeDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            fields,
            extra,
        }
    }

    /// Whether any field (or the extras slot) holds expressions.
    pub fn uses_expressions(&self) -> bool {
        self.fields
            .values()
            .any(|f| f.dtype == DataType::Expression)
            || matches!(&self.extra, ExtraFields::Allow { dtype, .. } if *dtype == DataType::Expression)
    }

    /// Renders the shape as a JSON Schema object.
    ///
    /// Expression-typed slots reference `#/$defs/Expression`; the
    /// definitions are attached when the shape uses them.
    pub fn to_json_schema(&self) -> Result<serde_json::Value, CoreError> {
        let mut properties = serde_json::Map::new();
        for (name, field) in &self.fields {
            let mut schema = dtype_schema(&field.dtype)?;
            if let Some(description) = field.description.as_deref().filter(|d| !d.is_empty()) {
                schema["description"] = json!(description);
            }
            properties.insert(name.clone(), schema);
        }

        let additional = match &self.extra {
            ExtraFields::Forbid => json!(false),
            ExtraFields::Allow { dtype, description } => {
                let mut schema = dtype_schema(dtype)?;
                if let Some(description) = description.as_deref().filter(|d| !d.is_empty()) {
                    schema["description"] = json!(description);
                }
                schema
            }
        };

        let mut schema = json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": self.fields.keys().collect::<Vec<_>>(),
            "additionalProperties": additional,
        });
        if !self.description.is_empty() {
            schema["description"] = json!(self.description);
        }
        if self.uses_expressions() {
            schema["$defs"] = ast::expression_schema_defs();
        }
        Ok(schema)
    }
}

fn doc(description: &Option<String>) -> &str {
    description.as_deref().unwrap_or("")
}

fn wrong_type(field: &str, expected: &DataType, value: &Value) -> Violation {
    Violation::WrongType {
        field: field.to_string(),
        expected: expected.clone(),
        actual: value.type_name().to_string(),
    }
}

/// JSON Schema fragment for one declared type.
pub(crate) fn dtype_schema(dtype: &DataType) -> Result<serde_json::Value, CoreError> {
    Ok(match dtype.materialize()? {
        DataType::Text => json!({ "type": "string" }),
        DataType::Decimal => json!({ "type": "number" }),
        DataType::Bool => json!({ "type": "boolean" }),
        DataType::Expression => json!({ "$ref": "#/$defs/Expression" }),
        DataType::Unresolved(name) => {
            return Err(CoreError::UnknownType { name: name.clone() })
        }
    })
}

/// Builder for [`ShapeDescriptor`].
#[derive(Debug, Clone)]
pub struct ShapeBuilder {
    shape: ShapeDescriptor,
}

impl ShapeBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.shape.description = description.into();
        self
    }

    /// Declares a documented, required field.
    pub fn field(
        mut self,
        name: impl Into<String>,
        dtype: impl Into<DataType>,
        description: impl Into<String>,
    ) -> Self {
        self.shape.fields.insert(
            name.into(),
            FieldDescriptor {
                dtype: dtype.into(),
                description: Some(description.into()),
            },
        );
        self
    }

    /// Declares a required field without documentation.
    pub fn undocumented_field(mut self, name: impl Into<String>, dtype: impl Into<DataType>) -> Self {
        self.shape.fields.insert(
            name.into(),
            FieldDescriptor {
                dtype: dtype.into(),
                description: None,
            },
        );
        self
    }

    /// Accepts additional fields of one uniform type.
    pub fn allow_extra(mut self, dtype: impl Into<DataType>, description: Option<String>) -> Self {
        self.shape.extra = ExtraFields::Allow {
            dtype: dtype.into(),
            description,
        };
        self
    }

    pub fn build(self) -> ShapeDescriptor {
        self.shape
    }

    /// Builds the shape, resolving declared type names through `registry`.
    pub fn build_in(self, registry: &DtypeRegistry) -> ShapeDescriptor {
        self.shape.resolve_in(registry)
    }
}
