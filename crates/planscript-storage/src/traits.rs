//! The [`CallableStore`] trait defining the storage contract for callables.
//!
//! Two-layer API design:
//! - **Low-level** methods (`put`, `get`, `delete`, `list`) store opaque JSON
//!   payloads keyed by [`CallableKey`].
//! - **High-level** methods (`save_self_planned`, `load_self_planned`)
//!   convert self-planned callables to and from their snapshots.
//!
//! All backends implement this trait and are swappable.

use std::rc::Rc;

use planscript_eval::{CallableRef, Planner, SelfPlannedCallable, SelfPlannedSnapshot, SELF_PLANNED_TYPE};
use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::{CallableKey, CallableSummary};

/// The storage contract for callables.
///
/// The trait is synchronous, matching the single-threaded evaluator.
pub trait CallableStore {
    /// Inserts or replaces the payload stored under `key`.
    fn put(&mut self, key: &CallableKey, name: &str, payload: &serde_json::Value) -> Result<(), StorageError>;

    /// Loads the payload stored under `key`, verifying its hash.
    fn get(&self, key: &CallableKey) -> Result<serde_json::Value, StorageError>;

    /// Removes the entry under `key`.
    fn delete(&mut self, key: &CallableKey) -> Result<(), StorageError>;

    /// Lists stored callables, optionally only those of one type, ordered
    /// by key.
    fn list(&self, type_prefix: Option<&str>) -> Result<Vec<CallableSummary>, StorageError>;

    fn contains(&self, key: &CallableKey) -> Result<bool, StorageError> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // -------------------------------------------------------------------
    // High-level convenience methods
    // -------------------------------------------------------------------

    /// Persists a self-planned callable, including its cached program.
    fn save_self_planned(&mut self, callable: &SelfPlannedCallable) -> Result<CallableKey, StorageError> {
        let key = CallableKey::new(SELF_PLANNED_TYPE, callable.instance_id());
        let payload = serde_json::to_value(callable.snapshot())?;
        self.put(&key, callable.name(), &payload)?;
        debug!(%key, planned = callable.program().is_some(), "saved self-planned callable");
        Ok(key)
    }

    /// Restores a self-planned callable. Nested callables and the planner
    /// are not stored and must be supplied again.
    fn load_self_planned(
        &self,
        instance_id: Uuid,
        callables: Vec<CallableRef>,
        planner: Rc<dyn Planner>,
    ) -> Result<SelfPlannedCallable, StorageError> {
        let key = CallableKey::new(SELF_PLANNED_TYPE, instance_id);
        let snapshot: SelfPlannedSnapshot = serde_json::from_value(self.get(&key)?)?;
        if snapshot.instance_id != instance_id {
            return Err(StorageError::IntegrityError {
                reason: format!("payload under {} belongs to {}", key, snapshot.instance_id),
            });
        }
        SelfPlannedCallable::restore(snapshot, callables, planner).map_err(|e| StorageError::ReconstructionError {
            reason: e.to_string(),
        })
    }
}
