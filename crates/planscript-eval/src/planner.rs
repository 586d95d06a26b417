//! The planner seam: turning instructions and contracts into a program.

use planscript_core::{
    from_structured_shape, CallableDefinition, CoreError, InvocationTemplate, PlaceholderContract, Program,
};
use serde::{Deserialize, Serialize};

use crate::callable::CallableRef;
use crate::error::PlanningError;

/// One callable offered to a planner: its public definition, its parameter
/// contract and the template every invocation of it must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub definition: CallableDefinition,
    /// Declared parameter types, including the type of extra arguments.
    pub parameters: PlaceholderContract,
    pub template: InvocationTemplate,
}

impl ToolSpec {
    pub fn from_callable(callable: &CallableRef) -> Result<Self, CoreError> {
        Ok(ToolSpec {
            definition: callable.definition(),
            parameters: from_structured_shape(&callable.input_shape()),
            template: callable.invocation_template()?,
        })
    }
}

/// Everything a planner needs to produce a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    /// Free-text description of what the program should do.
    pub instructions: String,
    /// Variables in scope when the program starts.
    pub inputs: PlaceholderContract,
    /// Names the program's return statement must produce.
    pub outputs: PlaceholderContract,
    pub tools: Vec<ToolSpec>,
}

impl PlanningRequest {
    pub fn new(
        instructions: impl Into<String>,
        inputs: PlaceholderContract,
        outputs: PlaceholderContract,
        callables: &[CallableRef],
    ) -> Result<Self, CoreError> {
        let tools = callables
            .iter()
            .map(ToolSpec::from_callable)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PlanningRequest {
            instructions: instructions.into(),
            inputs,
            outputs,
            tools,
        })
    }

    pub fn tool(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.definition.name == name)
    }
}

/// Produces programs for self-planned callables.
///
/// Implementations may call out to a language model; the returned program
/// is checked by the caller before it is cached or run.
pub trait Planner {
    fn plan(&self, request: &PlanningRequest) -> Result<Program, PlanningError>;
}

/// A planner that always returns the same program. Useful for tests and
/// for replaying a stored plan.
#[derive(Debug, Clone)]
pub struct FixedPlanner {
    program: Program,
}

impl FixedPlanner {
    pub fn new(program: Program) -> Self {
        FixedPlanner { program }
    }
}

impl Planner for FixedPlanner {
    fn plan(&self, _request: &PlanningRequest) -> Result<Program, PlanningError> {
        Ok(self.program.clone())
    }
}

/// A planner that always fails with [`PlanningError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlanner;

impl Planner for NoPlanner {
    fn plan(&self, _request: &PlanningRequest) -> Result<Program, PlanningError> {
        Err(PlanningError::Unavailable {
            reason: "no planner configured".to_string(),
        })
    }
}
