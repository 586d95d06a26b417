//! Typed records: Rust structs that describe themselves as shapes.

use indexmap::IndexMap;
use planscript_core::{DataType, Decimal, ShapeDescriptor, ValidationError, Value, ValueMap, Violation};

/// A Rust type with an explicit shape descriptor.
///
/// `from_values` receives a map already bound to [`Record::shape`], so the
/// `take_*` helpers below only fail if the shape and the conversion disagree.
pub trait Record: Sized {
    fn shape() -> ShapeDescriptor;

    fn from_values(values: ValueMap) -> Result<Self, ValidationError>;

    fn into_values(self) -> ValueMap;

    /// Binds `values` to the shape, then converts.
    fn bind(values: ValueMap) -> Result<Self, ValidationError> {
        Self::from_values(Self::shape().bind(values)?)
    }
}

/// Removes a decimal field from a bound map.
pub fn take_decimal(values: &mut ValueMap, shape: &str, field: &str) -> Result<Decimal, ValidationError> {
    take(values, shape, field, DataType::Decimal, |v| v.as_decimal())
}

/// Removes a text field from a bound map.
pub fn take_text(values: &mut ValueMap, shape: &str, field: &str) -> Result<String, ValidationError> {
    take(values, shape, field, DataType::Text, |v| v.as_text().map(str::to_string))
}

/// Drains the remaining (extra) fields of a bound map as decimals.
pub fn drain_decimals(values: ValueMap, shape: &str) -> Result<IndexMap<String, Decimal>, ValidationError> {
    let mut out = IndexMap::with_capacity(values.len());
    let mut violations = Vec::new();
    for (name, value) in values {
        match value.as_decimal() {
            Some(d) => {
                out.insert(name, d);
            }
            None => violations.push(Violation::WrongType {
                field: name,
                expected: DataType::Decimal,
                actual: value.type_name().to_string(),
            }),
        }
    }
    if violations.is_empty() {
        Ok(out)
    } else {
        Err(ValidationError {
            shape: shape.to_string(),
            violations,
        })
    }
}

fn take<T>(
    values: &mut ValueMap,
    shape: &str,
    field: &str,
    expected: DataType,
    extract: impl FnOnce(&Value) -> Option<T>,
) -> Result<T, ValidationError> {
    let violation = match values.shift_remove(field) {
        Some(value) => match extract(&value) {
            Some(out) => return Ok(out),
            None => Violation::WrongType {
                field: field.to_string(),
                expected,
                actual: value.type_name().to_string(),
            },
        },
        None => Violation::Missing {
            field: field.to_string(),
        },
    };
    Err(ValidationError {
        shape: shape.to_string(),
        violations: vec![violation],
    })
}
