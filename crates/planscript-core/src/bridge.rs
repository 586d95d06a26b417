//! Schema bridge between shape descriptors and placeholder contracts.
//!
//! Four operations keep the two representations consistent:
//!
//! - [`from_structured_shape`]: descriptor -> contract.
//! - [`to_structured_shape`]: contract -> descriptor (every placeholder
//!   becomes a required field; extras become the additional-field policy).
//! - [`with_uniform_type`]: rebinds every slot's declared type, keeping names
//!   and descriptions.
//! - [`to_invocation_template`]: the expression-typed argument schema a
//!   planner must satisfy to call a callable.
//!
//! Round-trip law: `to_structured_shape(&from_structured_shape(s), &s.name)`
//! is [equivalent](ShapeDescriptor::is_equivalent) to `s` whenever `s` uses
//! only resolved types.

use crate::dtype::DataType;
use crate::error::CoreError;
use crate::placeholder::{PlaceholderContract, PlaceholderDefinition, PlaceholderExtras};
use crate::shape::{ExtraFields, FieldDescriptor, ShapeDescriptor};
use crate::template::InvocationTemplate;

/// Derives a placeholder contract from a shape descriptor.
///
/// Missing documentation becomes an empty description.
pub fn from_structured_shape(shape: &ShapeDescriptor) -> PlaceholderContract {
    let placeholders = shape
        .fields
        .iter()
        .map(|(name, field)| {
            (
                name.clone(),
                PlaceholderDefinition {
                    dtype: field.dtype.clone(),
                    description: field.description.clone().unwrap_or_default(),
                },
            )
        })
        .collect();

    let extras = match &shape.extra {
        ExtraFields::Forbid => None,
        ExtraFields::Allow { dtype, description } => Some(PlaceholderExtras {
            dtype: dtype.clone(),
            description: description.clone().unwrap_or_default(),
        }),
    };

    PlaceholderContract {
        placeholders,
        extras,
    }
}

/// Builds a shape descriptor named `type_name` from a contract.
///
/// Returns [`CoreError::UnknownType`] if any declared type is unresolved.
pub fn to_structured_shape(
    contract: &PlaceholderContract,
    type_name: &str,
) -> Result<ShapeDescriptor, CoreError> {
    let mut fields = indexmap::IndexMap::with_capacity(contract.placeholders.len());
    for (name, placeholder) in &contract.placeholders {
        fields.insert(
            name.clone(),
            FieldDescriptor {
                dtype: placeholder.dtype.materialize()?.clone(),
                description: non_empty(&placeholder.description),
            },
        );
    }

    let extra = match &contract.extras {
        None => ExtraFields::Forbid,
        Some(extras) => ExtraFields::Allow {
            dtype: extras.dtype.materialize()?.clone(),
            description: non_empty(&extras.description),
        },
    };

    Ok(ShapeDescriptor {
        name: type_name.to_string(),
        description: String::new(),
        fields,
        extra,
    })
}

fn non_empty(description: &str) -> Option<String> {
    (!description.is_empty()).then(|| description.to_string())
}

/// Deep copy of `contract` with every declared type (including extras)
/// replaced by `dtype`. Names and descriptions are preserved.
pub fn with_uniform_type(contract: &PlaceholderContract, dtype: DataType) -> PlaceholderContract {
    PlaceholderContract {
        placeholders: contract
            .placeholders
            .iter()
            .map(|(name, placeholder)| {
                (
                    name.clone(),
                    PlaceholderDefinition {
                        dtype: dtype.clone(),
                        description: placeholder.description.clone(),
                    },
                )
            })
            .collect(),
        extras: contract.extras.as_ref().map(|extras| PlaceholderExtras {
            dtype: dtype.clone(),
            description: extras.description.clone(),
        }),
    }
}

/// Derives the invocation template for a callable from its parameter
/// contract: the callable name is fixed and every argument must be an
/// expression.
pub fn to_invocation_template(
    contract: &PlaceholderContract,
    callable_name: &str,
    description: &str,
) -> Result<InvocationTemplate, CoreError> {
    let expression_typed = with_uniform_type(contract, DataType::Expression);
    let mut arguments = to_structured_shape(&expression_typed, &format!("{}_arguments", callable_name))?;
    arguments.description = description.to_string();
    Ok(InvocationTemplate {
        callable_name: callable_name.to_string(),
        description: description.to_string(),
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use proptest::prelude::*;

    fn summation_inputs() -> ShapeDescriptor {
        ShapeDescriptor::builder("SummationInputs")
            .field("a", "int", "First term")
            .undocumented_field("b", "int")
            .allow_extra("int", None)
            .build()
    }

    #[test]
    fn contract_from_shape_uses_empty_description_for_missing_docs() {
        let contract = from_structured_shape(&summation_inputs());
        assert_eq!(contract.placeholders["a"].description, "First term");
        assert_eq!(contract.placeholders["b"].description, "");
        assert_eq!(contract.placeholders["b"].dtype, DataType::Decimal);
        let extras = contract.extras.as_ref().unwrap();
        assert_eq!(extras.dtype, DataType::Decimal);
    }

    #[test]
    fn closed_shape_has_no_extras() {
        let shape = ShapeDescriptor::builder("Out").field("sum", "int", "").build();
        assert!(from_structured_shape(&shape).extras.is_none());
    }

    #[test]
    fn round_trip_preserves_shape() {
        let shape = summation_inputs();
        let back = to_structured_shape(&from_structured_shape(&shape), &shape.name).unwrap();
        assert!(back.is_equivalent(&shape));
        assert!(back.allows_extra());
    }

    #[test]
    fn to_shape_rejects_unknown_types() {
        let contract = PlaceholderContract::new(IndexMap::from([(
            "x".to_string(),
            PlaceholderDefinition::new("complex128", ""),
        )]));
        assert_eq!(
            to_structured_shape(&contract, "S"),
            Err(CoreError::UnknownType {
                name: "complex128".into()
            })
        );
    }

    #[test]
    fn uniform_type_rebinds_extras_too() {
        let contract = from_structured_shape(&summation_inputs());
        let retyped = with_uniform_type(&contract, DataType::Expression);
        assert!(retyped
            .placeholders
            .values()
            .all(|p| p.dtype == DataType::Expression));
        assert_eq!(retyped.extras.unwrap().dtype, DataType::Expression);
        // The source contract is untouched.
        assert_eq!(contract.placeholders["a"].dtype, DataType::Decimal);
    }

    #[test]
    fn invocation_template_fixes_callable_name() {
        let contract = from_structured_shape(&summation_inputs());
        let template = to_invocation_template(&contract, "summation", "Sum numbers").unwrap();
        assert_eq!(template.callable_name, "summation");
        assert_eq!(template.arguments.name, "summation_arguments");
        assert!(template.arguments.uses_expressions());
        assert!(template.arguments.allows_extra());
        assert_eq!(
            template.arguments.fields["a"].description.as_deref(),
            Some("First term")
        );
    }

    fn arb_dtype() -> impl Strategy<Value = DataType> {
        prop_oneof![
            Just(DataType::Text),
            Just(DataType::Decimal),
            Just(DataType::Bool),
        ]
    }

    fn arb_shape() -> impl Strategy<Value = ShapeDescriptor> {
        (
            "[A-Z][a-zA-Z]{0,8}",
            prop::collection::vec(("[a-z_]{1,8}", arb_dtype(), prop::option::of("[a-z ]{0,12}")), 0..6),
            prop::option::of((arb_dtype(), prop::option::of("[a-z ]{0,12}"))),
        )
            .prop_map(|(name, fields, extra)| {
                let mut builder = ShapeDescriptor::builder(name);
                for (field, dtype, description) in fields {
                    builder = match description {
                        Some(d) => builder.field(field, dtype, d),
                        None => builder.undocumented_field(field, dtype),
                    };
                }
                if let Some((dtype, description)) = extra {
                    builder = builder.allow_extra(dtype, description);
                }
                builder.build()
            })
    }

    proptest! {
        #[test]
        fn round_trip_law(shape in arb_shape()) {
            let contract = from_structured_shape(&shape);
            let back = to_structured_shape(&contract, &shape.name).unwrap();
            prop_assert!(back.is_equivalent(&shape));
            prop_assert_eq!(from_structured_shape(&back), contract);
        }

        #[test]
        fn uniform_type_preserves_names_and_descriptions(shape in arb_shape(), dtype in arb_dtype()) {
            let contract = from_structured_shape(&shape);
            let retyped = with_uniform_type(&contract, dtype.clone());

            prop_assert_eq!(
                retyped.placeholders.keys().collect::<Vec<_>>(),
                contract.placeholders.keys().collect::<Vec<_>>()
            );
            for (name, placeholder) in &retyped.placeholders {
                prop_assert_eq!(&placeholder.dtype, &dtype);
                prop_assert_eq!(&placeholder.description, &contract.placeholders[name].description);
            }
            prop_assert_eq!(retyped.extras.is_some(), contract.extras.is_some());
            if let (Some(new), Some(old)) = (&retyped.extras, &contract.extras) {
                prop_assert_eq!(&new.dtype, &dtype);
                prop_assert_eq!(&new.description, &old.description);
            }
        }
    }
}
