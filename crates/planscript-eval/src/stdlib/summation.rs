use indexmap::IndexMap;
use planscript_core::{Decimal, ShapeDescriptor, ValidationError, Value, ValueMap};

use crate::callable::SimpleCallable;
use crate::error::CallableError;
use crate::record::{drain_decimals, take_decimal, Record};

/// Adds two or more numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Summation;

#[derive(Debug, Clone, PartialEq)]
pub struct SummationInputs {
    pub a: Decimal,
    pub b: Decimal,
    /// Additional terms, in input order.
    pub extra: IndexMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummationOutputs {
    pub sum: Decimal,
}

impl Record for SummationInputs {
    fn shape() -> ShapeDescriptor {
        ShapeDescriptor::builder("SummationInputs")
            .description("The numbers to add")
            .field("a", "int", "First number to add")
            .field("b", "int", "Second number to add")
            .allow_extra("int", Some("Additional numbers to add".to_string()))
            .build()
    }

    fn from_values(mut values: ValueMap) -> Result<Self, ValidationError> {
        let a = take_decimal(&mut values, "SummationInputs", "a")?;
        let b = take_decimal(&mut values, "SummationInputs", "b")?;
        let extra = drain_decimals(values, "SummationInputs")?;
        Ok(SummationInputs { a, b, extra })
    }

    fn into_values(self) -> ValueMap {
        let mut values = ValueMap::from([("a".to_string(), Value::from(self.a)), ("b".to_string(), Value::from(self.b))]);
        values.extend(self.extra.into_iter().map(|(k, v)| (k, Value::from(v))));
        values
    }
}

impl Record for SummationOutputs {
    fn shape() -> ShapeDescriptor {
        ShapeDescriptor::builder("SummationOutputs")
            .field("sum", "int", "The sum of the numbers")
            .build()
    }

    fn from_values(mut values: ValueMap) -> Result<Self, ValidationError> {
        Ok(SummationOutputs {
            sum: take_decimal(&mut values, "SummationOutputs", "sum")?,
        })
    }

    fn into_values(self) -> ValueMap {
        ValueMap::from([("sum".to_string(), Value::from(self.sum))])
    }
}

impl SimpleCallable for Summation {
    const NAME: &'static str = "summation";
    const DESCRIPTION: &'static str = "A tool for summing some numbers";

    type Inputs = SummationInputs;
    type Outputs = SummationOutputs;

    fn run(&self, inputs: SummationInputs) -> Result<SummationOutputs, CallableError> {
        let mut sum = inputs.a;
        for term in std::iter::once(inputs.b).chain(inputs.extra.into_values()) {
            sum = sum
                .checked_add(term)
                .ok_or_else(|| CallableError::failed("decimal overflow"))?;
        }
        Ok(SummationOutputs { sum })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Callable;

    fn inputs(pairs: &[(&str, i64)]) -> ValueMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn adds_declared_and_extra_terms() {
        let bound = Summation.input_shape().bind(inputs(&[("a", 1), ("b", 2), ("c", 4)])).unwrap();
        let out = Summation.execute(bound).unwrap();
        assert_eq!(out["sum"], Value::from(7));
    }

    #[test]
    fn definition_and_template() {
        let def = Summation.definition();
        assert_eq!(def.name, "summation");
        assert!(def.allow_extra_parameters);
        assert_eq!(def.to_string(), "summation(a: decimal, b: decimal, ...) -> (sum: decimal)");

        let template = Summation.invocation_template().unwrap();
        assert_eq!(template.callable_name, "summation");
        assert_eq!(template.description, "The numbers to add");
        assert!(template.arguments.allows_extra());
    }

    #[test]
    fn overflow_is_an_execution_failure() {
        let bound = Summation
            .input_shape()
            .bind(ValueMap::from([
                ("a".to_string(), Value::from(Decimal::MAX)),
                ("b".to_string(), Value::from(1)),
            ]))
            .unwrap();
        assert_eq!(
            Summation.execute(bound),
            Err(CallableError::failed("decimal overflow"))
        );
    }

    #[test]
    fn records_round_trip_through_value_maps() {
        let record = SummationInputs {
            a: Decimal::from(1),
            b: Decimal::from(2),
            extra: IndexMap::from([("c".to_string(), Decimal::from(3))]),
        };
        assert_eq!(SummationInputs::bind(record.clone().into_values()).unwrap(), record);
    }

    proptest::proptest! {
        #[test]
        fn sum_matches_integer_arithmetic(terms in proptest::collection::vec(-1_000_000i64..1_000_000, 2..8)) {
            let values: ValueMap = terms
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let name = match i {
                        0 => "a".to_string(),
                        1 => "b".to_string(),
                        n => format!("extra_{}", n),
                    };
                    (name, Value::from(*t))
                })
                .collect();
            let out = Summation.execute(Summation.input_shape().bind(values).unwrap()).unwrap();
            proptest::prop_assert_eq!(&out["sum"], &Value::from(terms.iter().sum::<i64>()));
        }
    }
}
