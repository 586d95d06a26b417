//! The callable abstraction.
//!
//! Anything a program can invoke implements [`Callable`]: it publishes a
//! [`CallableDefinition`], explicit input and output shapes, and an
//! [`InvocationTemplate`] derived from its inputs, and it executes on a
//! bound value map. Fixed-logic callables are usually written against
//! [`SimpleCallable`] with typed [`Record`] inputs and outputs.

use std::rc::Rc;

use planscript_core::{
    from_structured_shape, to_invocation_template, CallableDefinition, CoreError, InvocationTemplate,
    ShapeDescriptor, ValueMap,
};

use crate::error::CallableError;
use crate::record::Record;

/// Description used for invocation templates when the input shape has none.
pub const DEFAULT_ARGUMENTS_DESCRIPTION: &str = "The arguments to be passed to the callable";

/// A named unit of work with explicit input/output shapes.
pub trait Callable {
    fn definition(&self) -> CallableDefinition;

    fn input_shape(&self) -> ShapeDescriptor;

    fn output_shape(&self) -> ShapeDescriptor;

    /// The schema a planner must satisfy to invoke this callable.
    fn invocation_template(&self) -> Result<InvocationTemplate, CoreError> {
        let inputs = self.input_shape();
        let description = if inputs.description.is_empty() {
            DEFAULT_ARGUMENTS_DESCRIPTION
        } else {
            inputs.description.as_str()
        };
        to_invocation_template(&from_structured_shape(&inputs), &self.definition().name, description)
    }

    /// Runs the callable. `input` has already been bound to
    /// [`input_shape`](Callable::input_shape) by the evaluator.
    fn execute(&self, input: ValueMap) -> Result<ValueMap, CallableError>;
}

/// Shared handle to a callable. Run states and self-planned callables hold
/// these; a callable may appear in several registries at once.
pub type CallableRef = Rc<dyn Callable>;

/// A callable with fixed logic over typed records.
pub trait SimpleCallable {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    type Inputs: Record;
    type Outputs: Record;

    fn run(&self, inputs: Self::Inputs) -> Result<Self::Outputs, CallableError>;
}

impl<T: SimpleCallable> Callable for T {
    fn definition(&self) -> CallableDefinition {
        CallableDefinition::from_contracts(
            T::NAME,
            T::DESCRIPTION,
            &from_structured_shape(&T::Inputs::shape()),
            &from_structured_shape(&T::Outputs::shape()),
        )
    }

    fn input_shape(&self) -> ShapeDescriptor {
        T::Inputs::shape()
    }

    fn output_shape(&self) -> ShapeDescriptor {
        T::Outputs::shape()
    }

    fn execute(&self, input: ValueMap) -> Result<ValueMap, CallableError> {
        let inputs = T::Inputs::from_values(input)?;
        Ok(self.run(inputs)?.into_values())
    }
}
