//! Runtime value representation.
//!
//! [`Value`] is the dynamic counterpart of [`DataType`](crate::dtype::DataType):
//! variables, literals, callable arguments and callable outputs all carry
//! `Value`s. Values map onto plain JSON so that planner output and persisted
//! programs stay readable.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Named values in insertion order: variable scopes, argument maps and
/// callable outputs.
pub type ValueMap = IndexMap<String, Value>;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    /// Arbitrary-precision decimal. Integers are decimals with zero scale.
    Number(Decimal),
    Bool(bool),
    /// A callable's full output map, produced when an invocation is used
    /// directly as a returned expression. No declared type accepts it.
    Record(ValueMap),
}

impl Value {
    /// Returns a human-readable description of the value's kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "str",
            Value::Number(_) => "decimal",
            Value::Bool(_) => "bool",
            Value::Record(_) => "record",
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Number(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts a JSON value.
    ///
    /// Numbers are parsed from their JSON text so `0.1` becomes exactly
    /// `0.1`. `null` and arrays have no counterpart and are rejected.
    pub fn from_json(json: &serde_json::Value) -> Result<Value, CoreError> {
        match json {
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => parse_number(n).map(Value::Number),
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), Value::from_json(v)?)))
                .collect::<Result<ValueMap, CoreError>>()
                .map(Value::Record),
            serde_json::Value::Null => Err(CoreError::UnsupportedValue {
                reason: "null has no value representation".into(),
            }),
            serde_json::Value::Array(_) => Err(CoreError::UnsupportedValue {
                reason: "arrays have no value representation".into(),
            }),
        }
    }

    /// Converts to JSON.
    ///
    /// Integral decimals become JSON integers; other decimals go through
    /// their shortest text form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(d) => decimal_to_json(*d),
            Value::Record(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn parse_number(n: &serde_json::Number) -> Result<Decimal, CoreError> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| CoreError::UnsupportedValue {
            reason: format!("number {} is not representable as a decimal: {}", text, e),
        })
}

fn decimal_to_json(d: Decimal) -> serde_json::Value {
    let normalized = d.normalize();
    if normalized.scale() == 0 {
        if let Some(i) = normalized.to_i64() {
            return serde_json::Value::from(i);
        }
    }
    serde_json::Number::from_str(&normalized.to_string())
        .map(serde_json::Value::Number)
        .unwrap_or_else(|_| serde_json::Value::String(normalized.to_string()))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Number(d) => write!(f, "{}", d.normalize()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Record(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(&json).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Number(d)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Decimal::from(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(Decimal::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl TryFrom<f64> for Value {
    type Error = CoreError;

    fn try_from(f: f64) -> Result<Self, Self::Error> {
        Decimal::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| CoreError::UnsupportedValue {
                reason: format!("{} is not representable as a decimal", f),
            })
    }
}
