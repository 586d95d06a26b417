//! Saving and restoring self-planned callables through both backends.

use std::rc::Rc;

use planscript_core::{
    AssignmentStatement, Expression, PlaceholderDefinition, Placeholders, Program, ReturnStatement, Value, ValueMap,
};
use planscript_eval::{stdlib, Callable, FixedPlanner, NoPlanner, SelfPlannedCallable, SELF_PLANNED_TYPE};
use planscript_storage::{CallableKey, CallableStore, InMemoryStore, SqliteStore, StorageError};
use uuid::Uuid;

fn ints(names: &[&str]) -> Placeholders {
    names
        .iter()
        .map(|n| (n.to_string(), PlaceholderDefinition::new("int", "")))
        .collect()
}

fn values(pairs: &[(&str, i64)]) -> ValueMap {
    pairs.iter().map(|(k, v)| (k.to_string(), Value::from(*v))).collect()
}

fn planned_agent() -> SelfPlannedCallable {
    let program = Program::new(
        vec![AssignmentStatement::new(
            [("c", "sum")],
            Expression::invoke("summation", [("a", Expression::variable("a")), ("b", Expression::variable("b"))]),
        )],
        ReturnStatement::new([("c", Expression::variable("c"))]),
    );
    let agent = SelfPlannedCallable::new(
        "summation agent",
        "Provided two input integers a and b, compute c=a+b",
        ints(&["a", "b"]),
        ints(&["c"]),
        stdlib::callables(),
        Rc::new(FixedPlanner::new(program)),
    )
    .unwrap();
    assert_eq!(agent.execute(values(&[("a", 1), ("b", 2)])).unwrap(), values(&[("c", 3)]));
    agent
}

fn round_trip(store: &mut dyn CallableStore) {
    let agent = planned_agent();
    let key = store.save_self_planned(&agent).unwrap();
    assert_eq!(key, CallableKey::new(SELF_PLANNED_TYPE, agent.instance_id()));

    // A planner that always fails proves the stored program is reused.
    let restored = store
        .load_self_planned(agent.instance_id(), stdlib::callables(), Rc::new(NoPlanner))
        .unwrap();
    assert_eq!(restored.program(), agent.program());
    assert_eq!(restored.execute(values(&[("a", 1), ("b", 2)])).unwrap(), values(&[("c", 3)]));

    let listed = store.list(Some(SELF_PLANNED_TYPE)).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "summation agent");
}

#[test]
fn in_memory_round_trip() {
    round_trip(&mut InMemoryStore::new());
}

#[test]
fn sqlite_round_trip() {
    round_trip(&mut SqliteStore::in_memory().unwrap());
}

#[test]
fn sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("callables.db");
    let path = path.to_str().unwrap();

    let agent = planned_agent();
    {
        let mut store = SqliteStore::new(path).unwrap();
        store.save_self_planned(&agent).unwrap();
    }

    let store = SqliteStore::new(path).unwrap();
    let restored = store
        .load_self_planned(agent.instance_id(), stdlib::callables(), Rc::new(NoPlanner))
        .unwrap();
    assert_eq!(restored.execute(values(&[("a", 5), ("b", 6)])).unwrap(), values(&[("c", 11)]));
}

#[test]
fn loading_unknown_instance_is_not_found() {
    let store = InMemoryStore::new();
    let err = store
        .load_self_planned(Uuid::new_v4(), vec![], Rc::new(NoPlanner))
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[test]
fn unplanned_callable_restores_without_program() {
    let mut store = InMemoryStore::new();
    let agent = SelfPlannedCallable::new("idle", "", ints(&["a"]), ints(&["b"]), vec![], Rc::new(NoPlanner)).unwrap();
    store.save_self_planned(&agent).unwrap();

    let payload = store
        .get(&CallableKey::new(SELF_PLANNED_TYPE, agent.instance_id()))
        .unwrap();
    assert!(payload.get("program").is_none());

    let restored = store
        .load_self_planned(agent.instance_id(), vec![], Rc::new(NoPlanner))
        .unwrap();
    assert!(restored.program().is_none());
}
