//! Built-in callables.

mod summation;

use std::rc::Rc;

use crate::callable::CallableRef;

pub use summation::{Summation, SummationInputs, SummationOutputs};

/// The default callable registry.
pub fn callables() -> Vec<CallableRef> {
    vec![Rc::new(Summation)]
}
