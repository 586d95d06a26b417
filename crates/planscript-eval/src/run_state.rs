//! Mutable evaluation context for one program run.
//!
//! A [`RunState`] owns the variable scope and the result slot, and holds the
//! callable registry the program may invoke. The result slot starts empty
//! and, once set, ends the run: no further statement is executed.

use std::collections::HashMap;

use planscript_core::{ProgramResult, Value, ValueMap};

use crate::callable::CallableRef;
use crate::error::EvalError;

pub struct RunState {
    callables: Vec<CallableRef>,
    variables: ValueMap,
    result: Option<ProgramResult>,
}

impl RunState {
    /// An empty scope over the given callables.
    pub fn new(callables: Vec<CallableRef>) -> Self {
        RunState {
            callables,
            variables: ValueMap::new(),
            result: None,
        }
    }

    /// Seeds the scope, e.g. with a program's bound inputs.
    pub fn with_variables<K, V, I>(mut self, variables: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn callables(&self) -> &[CallableRef] {
        &self.callables
    }

    /// Builds the name index over the registry.
    ///
    /// The index is rebuilt on every call so callables added between
    /// lookups are seen. Two callables publishing the same name are an error.
    pub fn callable_index(&self) -> Result<HashMap<String, CallableRef>, EvalError> {
        let mut index = HashMap::with_capacity(self.callables.len());
        for callable in &self.callables {
            let name = callable.definition().name;
            if index.contains_key(&name) {
                return Err(EvalError::DuplicateCallable { name });
            }
            index.insert(name, CallableRef::clone(callable));
        }
        Ok(index)
    }

    pub fn lookup_callable(&self, name: &str) -> Result<CallableRef, EvalError> {
        self.callable_index()?
            .remove(name)
            .ok_or_else(|| EvalError::UnknownCallable {
                name: name.to_string(),
            })
    }

    pub fn add_callable(&mut self, callable: CallableRef) {
        self.callables.push(callable);
    }

    pub fn variables(&self) -> &ValueMap {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Result<&Value, EvalError> {
        self.variables
            .get(name)
            .ok_or_else(|| EvalError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Binds or rebinds a variable. Later assignments shadow earlier ones.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn result(&self) -> Option<&ProgramResult> {
        self.result.as_ref()
    }

    pub fn is_terminated(&self) -> bool {
        self.result.is_some()
    }

    /// Sets the result slot if it is still empty. The first result wins.
    pub(crate) fn terminate(&mut self, result: ProgramResult) -> &ProgramResult {
        self.result.get_or_insert(result)
    }

    pub fn into_result(self) -> Option<ProgramResult> {
        self.result
    }
}

impl Default for RunState {
    fn default() -> Self {
        RunState::new(crate::stdlib::callables())
    }
}

impl std::fmt::Debug for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.callables.iter().map(|c| c.definition().name).collect();
        f.debug_struct("RunState")
            .field("callables", &names)
            .field("variables", &self.variables)
            .field("result", &self.result)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::Summation;
    use std::rc::Rc;

    #[test]
    fn default_registry_has_summation() {
        let state = RunState::default();
        assert!(state.lookup_callable("summation").is_ok());
        assert_eq!(
            state.lookup_callable("product").err(),
            Some(EvalError::UnknownCallable {
                name: "product".into()
            })
        );
    }

    #[test]
    fn duplicate_names_fail_lookup() {
        let mut state = RunState::default();
        state.add_callable(Rc::new(Summation));
        assert_eq!(
            state.callable_index().err(),
            Some(EvalError::DuplicateCallable {
                name: "summation".into()
            })
        );
    }

    #[test]
    fn variables_shadow_and_result_is_write_once() {
        let mut state = RunState::new(vec![]).with_variables([("x", 1)]);
        state.set_variable("x", Value::from(2));
        assert_eq!(state.variable("x"), Ok(&Value::from(2)));
        assert!(matches!(state.variable("y"), Err(EvalError::UnknownVariable { .. })));

        state.terminate(ProgramResult::error("first"));
        state.terminate(ProgramResult::error("second"));
        assert_eq!(state.result().and_then(ProgramResult::error_message), Some("first"));
    }
}
