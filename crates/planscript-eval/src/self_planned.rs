//! Callables whose program is generated on first use.
//!
//! A [`SelfPlannedCallable`] is declared by instructions plus input and
//! output contracts. The first call asks its [`Planner`] for a program over
//! the callables it was given, checks it, and caches it; later calls reuse
//! the cached program. Each call evaluates the program in a fresh
//! [`RunState`] seeded with the bound inputs.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use planscript_core::{
    to_structured_shape, CallableDefinition, CoreError, PlaceholderContract, Placeholders, Program, ProgramResult,
    ShapeDescriptor, ValueMap,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::callable::{Callable, CallableRef};
use crate::check::check_program;
use crate::error::{CallableError, PlanningError};
use crate::eval::evaluate_program;
use crate::planner::{Planner, PlanningRequest};
use crate::run_state::RunState;

/// Storage discriminator for self-planned callables.
pub const SELF_PLANNED_TYPE: &str = "self_planned";

pub struct SelfPlannedCallable {
    instance_id: Uuid,
    name: String,
    instructions: String,
    inputs: Placeholders,
    expected_outputs: Placeholders,
    input_shape: ShapeDescriptor,
    output_shape: ShapeDescriptor,
    callables: Vec<CallableRef>,
    planner: Rc<dyn Planner>,
    program: RefCell<Option<Program>>,
}

/// Serializable state of a [`SelfPlannedCallable`]. The callables and the
/// planner are supplied again on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfPlannedSnapshot {
    pub instance_id: Uuid,
    pub name: String,
    pub instructions: String,
    pub inputs: Placeholders,
    pub expected_outputs: Placeholders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
}

impl SelfPlannedCallable {
    /// Declares a self-planned callable.
    ///
    /// Fails with [`CoreError::UnknownType`] if any input or output slot
    /// names an unsupported type.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        inputs: Placeholders,
        expected_outputs: Placeholders,
        callables: Vec<CallableRef>,
        planner: Rc<dyn Planner>,
    ) -> Result<Self, CoreError> {
        Self::build(
            Uuid::new_v4(),
            name.into(),
            instructions.into(),
            inputs,
            expected_outputs,
            callables,
            planner,
            None,
        )
    }

    /// Rebuilds a callable from a snapshot, keeping its identity and any
    /// cached program.
    pub fn restore(
        snapshot: SelfPlannedSnapshot,
        callables: Vec<CallableRef>,
        planner: Rc<dyn Planner>,
    ) -> Result<Self, CoreError> {
        Self::build(
            snapshot.instance_id,
            snapshot.name,
            snapshot.instructions,
            snapshot.inputs,
            snapshot.expected_outputs,
            callables,
            planner,
            snapshot.program,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        instance_id: Uuid,
        name: String,
        instructions: String,
        inputs: Placeholders,
        expected_outputs: Placeholders,
        callables: Vec<CallableRef>,
        planner: Rc<dyn Planner>,
        program: Option<Program>,
    ) -> Result<Self, CoreError> {
        let input_shape = to_structured_shape(&PlaceholderContract::new(inputs.clone()), &format!("{}_inputs", name))?;
        let output_shape =
            to_structured_shape(&PlaceholderContract::new(expected_outputs.clone()), &format!("{}_outputs", name))?;
        Ok(SelfPlannedCallable {
            instance_id,
            name,
            instructions,
            inputs,
            expected_outputs,
            input_shape,
            output_shape,
            callables,
            planner,
            program: RefCell::new(program),
        })
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// The cached program, if one has been generated.
    pub fn program(&self) -> Option<Program> {
        self.program.borrow().clone()
    }

    /// Discards the cached program; the next call plans again.
    pub fn clear_program(&self) {
        self.program.borrow_mut().take();
    }

    pub fn planning_request(&self) -> Result<PlanningRequest, CoreError> {
        PlanningRequest::new(
            self.instructions.clone(),
            PlaceholderContract::new(self.inputs.clone()),
            PlaceholderContract::new(self.expected_outputs.clone()),
            &self.callables,
        )
    }

    pub fn snapshot(&self) -> SelfPlannedSnapshot {
        SelfPlannedSnapshot {
            instance_id: self.instance_id,
            name: self.name.clone(),
            instructions: self.instructions.clone(),
            inputs: self.inputs.clone(),
            expected_outputs: self.expected_outputs.clone(),
            program: self.program(),
        }
    }

    /// Returns the cached program, planning and checking one first if needed.
    pub fn ensure_program(&self) -> Result<Program, PlanningError> {
        if let Some(program) = self.program.borrow().as_ref() {
            debug!(callable = %self.name, "reusing cached program");
            return Ok(program.clone());
        }

        let request = self.planning_request()?;
        info!(callable = %self.name, tools = request.tools.len(), "planning program");
        let program = self.planner.plan(&request)?;
        check_program(&program, &request).map_err(|issues| PlanningError::InvalidProgram { issues })?;
        debug!(callable = %self.name, statements = program.statements.len(), "program accepted");

        *self.program.borrow_mut() = Some(program.clone());
        Ok(program)
    }
}

impl Callable for SelfPlannedCallable {
    fn definition(&self) -> CallableDefinition {
        CallableDefinition {
            name: self.name.clone(),
            description: self.instructions.clone(),
            parameters: self.inputs.clone(),
            allow_extra_parameters: false,
            returns: self.expected_outputs.clone(),
        }
    }

    fn input_shape(&self) -> ShapeDescriptor {
        self.input_shape.clone()
    }

    fn output_shape(&self) -> ShapeDescriptor {
        self.output_shape.clone()
    }

    fn execute(&self, input: ValueMap) -> Result<ValueMap, CallableError> {
        let input = self.input_shape.bind(input)?;
        let program = self.ensure_program()?;

        let mut state = RunState::new(self.callables.clone()).with_variables(input);
        match evaluate_program(&program, &mut state) {
            ProgramResult::Ok { values } => self
                .output_shape
                .bind(values.clone())
                .map_err(CallableError::InvalidOutput),
            ProgramResult::Error { error } => Err(CallableError::ProgramFailed {
                message: error.clone(),
            }),
        }
    }
}

impl fmt::Debug for SelfPlannedCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelfPlannedCallable")
            .field("instance_id", &self.instance_id)
            .field("name", &self.name)
            .field("instructions", &self.instructions)
            .field("planned", &self.program.borrow().is_some())
            .finish_non_exhaustive()
    }
}
