//! Self-planned callables driven by a ChatPlanner over a scripted transport.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use planscript_core::{PlaceholderDefinition, Placeholders, Value, ValueMap};
use planscript_eval::{stdlib, Callable, CallableError, PlanningError, SelfPlannedCallable};
use planscript_planner::{ChatPlanner, ChatTransport, ProviderError};

/// Replays canned model replies and counts requests.
struct Replay {
    replies: RefCell<VecDeque<String>>,
    requests: Rc<Cell<usize>>,
}

impl ChatTransport for Replay {
    fn complete_json(&self, _user_message: &str) -> Result<String, ProviderError> {
        self.requests.set(self.requests.get() + 1);
        self.replies
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ProviderError::Request("script exhausted".into()))
    }
}

fn replay(replies: &[&str]) -> (Replay, Rc<Cell<usize>>) {
    let requests = Rc::new(Cell::new(0));
    (
        Replay {
            replies: RefCell::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: requests.clone(),
        },
        requests,
    )
}

fn ints(names: &[&str]) -> Placeholders {
    names
        .iter()
        .map(|n| (n.to_string(), PlaceholderDefinition::new("int", "")))
        .collect()
}

fn values(pairs: &[(&str, i64)]) -> ValueMap {
    pairs.iter().map(|(k, v)| (k.to_string(), Value::from(*v))).collect()
}

const ADD_PROGRAM: &str = r#"```json
{
  "statements": [{
    "assignments": {"c": "sum"},
    "rhs_expression": {
      "expr_type": "invocation",
      "name": "summation",
      "arguments": {
        "a": {"expr_type": "variable", "name": "a"},
        "b": {"expr_type": "variable", "name": "b"}
      }
    }
  }],
  "return_statement": {"return_values": {"c": {"expr_type": "variable", "name": "c"}}}
}
```"#;

const MISSING_OUTPUT: &str = r#"{"statements": [], "return_statement": {"return_values": {"a": {"expr_type": "variable", "name": "a"}}}}"#;

#[test]
fn repairs_rejected_program_then_caches_it() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let (transport, requests) = replay(&[MISSING_OUTPUT, ADD_PROGRAM]);
    let agent = SelfPlannedCallable::new(
        "summation agent",
        "Provided two input integers a and b, compute c=a+b",
        ints(&["a", "b"]),
        ints(&["c"]),
        stdlib::callables(),
        Rc::new(ChatPlanner::new(transport, 3)),
    )
    .unwrap();

    assert_eq!(agent.execute(values(&[("a", 1), ("b", 2)])).unwrap(), values(&[("c", 3)]));
    assert_eq!(agent.execute(values(&[("a", 1), ("b", 2)])).unwrap(), values(&[("c", 3)]));
    assert_eq!(requests.get(), 2);
}

#[test]
fn exhausted_attempts_surface_as_planning_error() {
    let (transport, requests) = replay(&[MISSING_OUTPUT, MISSING_OUTPUT]);
    let agent = SelfPlannedCallable::new(
        "summation agent",
        "compute c=a+b",
        ints(&["a", "b"]),
        ints(&["c"]),
        stdlib::callables(),
        Rc::new(ChatPlanner::new(transport, 2)),
    )
    .unwrap();

    match agent.execute(values(&[("a", 1), ("b", 2)])) {
        Err(CallableError::Planning(PlanningError::Exhausted { attempts, last })) => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, PlanningError::InvalidProgram { .. }));
        }
        other => panic!("expected exhausted planning, got {:?}", other),
    }
    assert_eq!(requests.get(), 2);
    assert!(agent.program().is_none());
}
