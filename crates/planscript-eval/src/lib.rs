//! Evaluation, callables and self-planning for planscript programs.
//!
//! - [`callable`]: the [`Callable`] trait and typed [`SimpleCallable`]s.
//! - [`run_state`] and [`eval`]: executing a [`Program`](planscript_core::Program)
//!   against a scope and a callable registry.
//! - [`check`]: static checking of generated programs.
//! - [`planner`] and [`self_planned`]: callables whose program is produced by
//!   a [`Planner`] on first use and cached.

pub mod callable;
pub mod check;
pub mod error;
pub mod eval;
pub mod planner;
pub mod record;
pub mod run_state;
pub mod self_planned;
pub mod stdlib;

pub use callable::{Callable, CallableRef, SimpleCallable};
pub use check::{check_program, CheckIssue};
pub use error::{CallableError, ErrorKind, EvalError, PlanningError};
pub use eval::{evaluate_expression, evaluate_program, execute_statement};
pub use planner::{FixedPlanner, NoPlanner, Planner, PlanningRequest, ToolSpec};
pub use record::Record;
pub use run_state::RunState;
pub use self_planned::{SelfPlannedCallable, SelfPlannedSnapshot, SELF_PLANNED_TYPE};
