pub mod ast;
pub mod bridge;
pub mod definition;
pub mod dtype;
pub mod error;
pub mod placeholder;
pub mod result;
pub mod shape;
pub mod template;
pub mod value;

// Re-export commonly used types
pub use ast::{AssignmentStatement, Expression, Invocation, Program, ReturnStatement, Statement};
pub use bridge::{from_structured_shape, to_invocation_template, to_structured_shape, with_uniform_type};
pub use definition::CallableDefinition;
pub use dtype::{DataType, DtypeRegistry};
pub use error::{CoreError, TemplateError, ValidationError, Violation};
pub use placeholder::{PlaceholderContract, PlaceholderDefinition, PlaceholderExtras, Placeholders};
pub use result::ProgramResult;
pub use shape::{ExtraFields, FieldDescriptor, ShapeBuilder, ShapeDescriptor};
pub use template::InvocationTemplate;
pub use value::{Value, ValueMap};

// Decimal is part of the public value model.
pub use rust_decimal::Decimal;
