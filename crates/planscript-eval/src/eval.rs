//! Evaluation of expressions, statements and programs against a [`RunState`].
//!
//! Expressions evaluate to a [`Value`]; an invocation evaluates to the
//! callable's returned map wrapped as [`Value::Record`]. Assignments project
//! names out of that map into the scope. A [`Program`] never fails outward:
//! the first error is rendered into the run state's result slot.

use planscript_core::{
    AssignmentStatement, Expression, Invocation, Program, ProgramResult, ReturnStatement, Statement, Value,
    ValueMap,
};
use tracing::{debug, warn};

use crate::error::EvalError;
use crate::run_state::RunState;

/// Evaluates one expression.
///
/// Variables read the scope, literals evaluate to themselves, and
/// invocations evaluate their arguments left to right, bind them to the
/// callable's input shape and execute it.
pub fn evaluate_expression(expr: &Expression, state: &RunState) -> Result<Value, EvalError> {
    match expr {
        Expression::Variable { name } => state.variable(name).cloned(),
        Expression::Literal { value } => Ok(value.clone()),
        Expression::Invocation(invocation) => invoke(invocation, state).map(Value::Record),
    }
}

/// Executes an invocation and returns the callable's result map.
pub fn invoke(invocation: &Invocation, state: &RunState) -> Result<ValueMap, EvalError> {
    let callable = state.lookup_callable(&invocation.name)?;

    let mut arguments = ValueMap::with_capacity(invocation.arguments.len());
    for (name, expr) in &invocation.arguments {
        arguments.insert(name.clone(), evaluate_expression(expr, state)?);
    }

    let bound = callable
        .input_shape()
        .bind(arguments)
        .map_err(|source| EvalError::Validation {
            callable: invocation.name.clone(),
            source,
        })?;

    debug!(callable = %invocation.name, "invoking callable");
    callable.execute(bound).map_err(|source| EvalError::Execution {
        callable: invocation.name.clone(),
        source,
    })
}

/// Executes one statement.
pub fn execute_statement(statement: &Statement, state: &mut RunState) -> Result<(), EvalError> {
    match statement {
        Statement::Assignment(assignment) => execute_assignment(assignment, state),
        Statement::Return(ret) => execute_return(ret, state),
    }
}

/// Evaluates the right-hand side once, then binds each local name to the
/// value the right-hand side returned under the mapped name.
///
/// All lookups happen before any variable is written, so a failed
/// assignment leaves the scope untouched.
pub fn execute_assignment(statement: &AssignmentStatement, state: &mut RunState) -> Result<(), EvalError> {
    let returned = match evaluate_expression(&statement.rhs_expression, state)? {
        Value::Record(map) => map,
        other => {
            return match statement.assignments.values().next() {
                Some(returned) => Err(EvalError::NotARecord {
                    returned: returned.clone(),
                    actual: other.type_name().to_string(),
                }),
                None => Ok(()),
            };
        }
    };

    let mut staged = Vec::with_capacity(statement.assignments.len());
    for (local, returned_name) in &statement.assignments {
        let value = returned
            .get(returned_name)
            .ok_or_else(|| EvalError::MissingReturnedName {
                returned: returned_name.clone(),
                available: returned.keys().cloned().collect(),
            })?;
        staged.push((local.clone(), value.clone()));
    }
    for (local, value) in staged {
        state.set_variable(local, value);
    }
    Ok(())
}

/// Evaluates every return expression in order and terminates the run with
/// the resulting map.
pub fn execute_return(statement: &ReturnStatement, state: &mut RunState) -> Result<(), EvalError> {
    let mut values = ValueMap::with_capacity(statement.return_values.len());
    for (name, expr) in &statement.return_values {
        values.insert(name.clone(), evaluate_expression(expr, state)?);
    }
    state.terminate(ProgramResult::ok(values));
    Ok(())
}

/// Runs a program to completion and returns the run state's result.
///
/// Statements execute in order; the run stops as soon as the result slot
/// is set. Any error is caught and stored as [`ProgramResult::Error`] with
/// its message. A state whose result is already set is not advanced.
pub fn evaluate_program<'s>(program: &Program, state: &'s mut RunState) -> &'s ProgramResult {
    if let Err(error) = run_statements(program, state) {
        warn!(kind = %error.kind(), %error, "program terminated with error");
        state.terminate(ProgramResult::error(error.to_string()));
    }
    state.terminate(ProgramResult::error("program ended without a result"))
}

fn run_statements(program: &Program, state: &mut RunState) -> Result<(), EvalError> {
    for (index, statement) in program.statements.iter().enumerate() {
        if state.is_terminated() {
            debug!(statement = index, "run already terminated");
            return Ok(());
        }
        execute_assignment(statement, state)?;
    }
    if !state.is_terminated() {
        execute_return(&program.return_statement, state)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn state() -> RunState {
        RunState::default().with_variables([("x", 1), ("y", 2)])
    }

    fn sum(a: Expression, b: Expression) -> Expression {
        Expression::invoke("summation", [("a", a), ("b", b)])
    }

    #[test]
    fn invocation_evaluates_to_record() {
        let value = evaluate_expression(&sum(Expression::variable("x"), Expression::literal(5)), &state()).unwrap();
        assert_eq!(
            value,
            Value::Record(ValueMap::from([("sum".to_string(), Value::from(6))]))
        );
    }

    #[test]
    fn nested_invocation_argument_fails_validation() {
        let expr = sum(sum(Expression::literal(1), Expression::literal(2)), Expression::literal(3));
        let err = evaluate_expression(&expr, &state()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn assignment_maps_returned_names() {
        let mut state = state();
        let stmt = AssignmentStatement::new([("total", "sum")], sum(Expression::variable("x"), Expression::variable("y")));
        execute_assignment(&stmt, &mut state).unwrap();
        assert_eq!(state.variable("total"), Ok(&Value::from(3)));
    }

    #[test]
    fn failed_assignment_leaves_scope_untouched() {
        let mut state = state();
        let stmt = AssignmentStatement::new(
            [("s", "sum"), ("t", "total")],
            sum(Expression::variable("x"), Expression::variable("y")),
        );
        let err = execute_assignment(&stmt, &mut state).unwrap_err();
        assert!(matches!(err, EvalError::MissingReturnedName { ref returned, .. } if returned == "total"));
        assert!(state.variable("s").is_err());
    }

    #[test]
    fn scalar_rhs_cannot_be_projected() {
        let mut state = state();
        let stmt = AssignmentStatement::new([("z", "value")], Expression::variable("x"));
        assert_eq!(
            execute_assignment(&stmt, &mut state),
            Err(EvalError::NotARecord {
                returned: "value".into(),
                actual: "decimal".into()
            })
        );
    }

    #[test]
    fn return_terminates_run() {
        let mut state = state();
        let stmt = Statement::Return(ReturnStatement::new([("out", Expression::variable("y"))]));
        execute_statement(&stmt, &mut state).unwrap();
        assert_eq!(
            state.result(),
            Some(&ProgramResult::ok(ValueMap::from([("out".to_string(), Value::from(2))])))
        );
    }

    #[test]
    fn terminated_state_is_not_advanced() {
        let mut state = state();
        state.terminate(ProgramResult::error("stopped"));
        let program = Program::new(
            vec![AssignmentStatement::new([("z", "sum")], sum(Expression::variable("x"), Expression::variable("y")))],
            ReturnStatement::new([("z", Expression::variable("z"))]),
        );
        assert_eq!(evaluate_program(&program, &mut state), &ProgramResult::error("stopped"));
        assert!(state.variable("z").is_err());
    }
}
