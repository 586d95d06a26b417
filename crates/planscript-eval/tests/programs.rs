//! End-to-end evaluation of hand-written programs against the built-in
//! summation callable.

use planscript_core::{AssignmentStatement, Expression, Program, ProgramResult, ReturnStatement, Value, ValueMap};
use planscript_eval::eval::invoke;
use planscript_eval::{evaluate_expression, evaluate_program, Callable, RunState};

fn xyz_state() -> RunState {
    RunState::default().with_variables([("x", 1), ("y", 2), ("z", 4)])
}

fn ok(pairs: &[(&str, i64)]) -> ProgramResult {
    ProgramResult::ok(pairs.iter().map(|(k, v)| (k.to_string(), Value::from(*v))).collect())
}

#[test]
fn summation_called_directly() {
    let summation = planscript_eval::stdlib::Summation;
    let input = ValueMap::from([("a".to_string(), Value::from(1)), ("b".to_string(), Value::from(2))]);
    let out = summation.execute(summation.input_shape().bind(input).unwrap()).unwrap();
    assert_eq!(out["sum"], Value::from(3));
}

#[test]
fn invocation_with_extra_argument() {
    let invocation = Expression::invoke(
        "summation",
        [
            ("a", Expression::variable("x")),
            ("b", Expression::variable("y")),
            ("c", Expression::variable("z")),
        ],
    );
    let state = xyz_state();
    assert_eq!(
        evaluate_expression(&invocation, &state).unwrap(),
        Value::Record(ValueMap::from([("sum".to_string(), Value::from(7))]))
    );

    let Expression::Invocation(invocation) = invocation else { unreachable!() };
    assert_eq!(invoke(&invocation, &state).unwrap()["sum"], Value::from(7));
}

#[test]
fn single_assignment_program() {
    let program = Program::new(
        vec![AssignmentStatement::new(
            [("result", "sum")],
            Expression::invoke(
                "summation",
                [
                    ("a", Expression::variable("x")),
                    ("b", Expression::variable("y")),
                    ("c", Expression::variable("z")),
                ],
            ),
        )],
        ReturnStatement::new([("final_result", Expression::variable("result"))]),
    );
    let mut state = xyz_state();
    assert_eq!(evaluate_program(&program, &mut state), &ok(&[("final_result", 7)]));
}

#[test]
fn two_step_program_chains_intermediate_variable() {
    let program = Program::new(
        vec![
            AssignmentStatement::new(
                [("intermediate_result", "sum")],
                Expression::invoke("summation", [("a", Expression::variable("x")), ("b", Expression::variable("y"))]),
            ),
            AssignmentStatement::new(
                [("result", "sum")],
                Expression::invoke(
                    "summation",
                    [
                        ("a", Expression::variable("intermediate_result")),
                        ("b", Expression::variable("z")),
                    ],
                ),
            ),
        ],
        ReturnStatement::new([("final_result", Expression::variable("result"))]),
    );
    let mut state = xyz_state();
    assert_eq!(evaluate_program(&program, &mut state), &ok(&[("final_result", 7)]));
    assert_eq!(state.variables()["intermediate_result"], Value::from(3));
}

#[test]
fn undefined_variable_in_return_is_an_error_result() {
    let program = Program::new(vec![], ReturnStatement::new([("out", Expression::variable("q"))]));
    let mut state = xyz_state();
    let result = evaluate_program(&program, &mut state);
    assert_eq!(result.error_message(), Some("lookup error: unknown variable 'q'"));
}

#[test]
fn first_failure_stops_the_run() {
    let program = Program::new(
        vec![
            AssignmentStatement::new(
                [("s", "sum")],
                Expression::invoke("summation", [("a", Expression::variable("x")), ("b", Expression::literal("two"))]),
            ),
            AssignmentStatement::new(
                [("t", "sum")],
                Expression::invoke("summation", [("a", Expression::variable("x")), ("b", Expression::variable("y"))]),
            ),
        ],
        ReturnStatement::new([("out", Expression::variable("t"))]),
    );
    let mut state = xyz_state();
    let message = evaluate_program(&program, &mut state)
        .error_message()
        .map(str::to_string)
        .unwrap();
    assert!(message.starts_with("validation error: arguments for 'summation' rejected"), "{}", message);
    assert!(state.variables().get("t").is_none());
}

#[test]
fn unknown_callable_and_literals() {
    let program = Program::new(
        vec![AssignmentStatement::new([("p", "product")], Expression::invoke("multiply", [("a", Expression::literal(2))]))],
        ReturnStatement::new([("out", Expression::literal(1))]),
    );
    let mut state = xyz_state();
    assert_eq!(
        evaluate_program(&program, &mut state).error_message(),
        Some("lookup error: unknown callable 'multiply'")
    );

    let literal_only = Program::new(vec![], ReturnStatement::new([("greeting", Expression::literal("hi"))]));
    let mut state = RunState::new(vec![]);
    assert_eq!(
        evaluate_program(&literal_only, &mut state),
        &ProgramResult::ok(ValueMap::from([("greeting".to_string(), Value::from("hi"))]))
    );
}
