//! In-memory implementation of [`CallableStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and ephemeral
//! sessions. It keeps the serialized payload text and hash, so it has the
//! same integrity semantics as the SQLite backend.

use std::collections::BTreeMap;

use crate::error::StorageError;
use crate::hash::{payload_hash, verify_payload};
use crate::traits::CallableStore;
use crate::types::{CallableKey, CallableSummary};

#[derive(Debug, Clone)]
struct StoredCallable {
    name: String,
    payload: String,
    payload_hash: String,
}

/// In-memory callable storage, ordered by key.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: BTreeMap<CallableKey, StoredCallable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CallableStore for InMemoryStore {
    fn put(&mut self, key: &CallableKey, name: &str, payload: &serde_json::Value) -> Result<(), StorageError> {
        let payload = serde_json::to_string(payload)?;
        let payload_hash = payload_hash(&payload);
        self.entries.insert(
            key.clone(),
            StoredCallable {
                name: name.to_string(),
                payload,
                payload_hash,
            },
        );
        Ok(())
    }

    fn get(&self, key: &CallableKey) -> Result<serde_json::Value, StorageError> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.clone()))?;
        if !verify_payload(&entry.payload, &entry.payload_hash) {
            return Err(StorageError::IntegrityError {
                reason: format!("payload hash mismatch for {}", key),
            });
        }
        Ok(serde_json::from_str(&entry.payload)?)
    }

    fn delete(&mut self, key: &CallableKey) -> Result<(), StorageError> {
        self.entries
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.clone()))
    }

    fn list(&self, type_prefix: Option<&str>) -> Result<Vec<CallableSummary>, StorageError> {
        Ok(self
            .entries
            .iter()
            .filter(|(key, _)| type_prefix.map_or(true, |p| key.type_prefix == p))
            .map(|(key, entry)| CallableSummary {
                key: key.clone(),
                name: entry.name.clone(),
                payload_hash: entry.payload_hash.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn put_get_delete() {
        let mut store = InMemoryStore::new();
        let key = CallableKey::new("self_planned", Uuid::new_v4());
        store.put(&key, "adder", &json!({"name": "adder"})).unwrap();
        assert_eq!(store.get(&key).unwrap(), json!({"name": "adder"}));
        assert!(store.contains(&key).unwrap());

        store.delete(&key).unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.get(&key), Err(StorageError::NotFound(k)) if k == key));
        assert!(matches!(store.delete(&key), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn tampered_payload_fails_integrity_check() {
        let mut store = InMemoryStore::new();
        let key = CallableKey::new("self_planned", Uuid::new_v4());
        store.put(&key, "adder", &json!({"program": null})).unwrap();
        if let Some(entry) = store.entries.get_mut(&key) {
            entry.payload = r#"{"program":{}}"#.to_string();
        }
        assert!(matches!(store.get(&key), Err(StorageError::IntegrityError { .. })));
    }

    #[test]
    fn list_filters_by_type() {
        let mut store = InMemoryStore::new();
        store
            .put(&CallableKey::new("self_planned", Uuid::new_v4()), "a", &json!({}))
            .unwrap();
        store
            .put(&CallableKey::new("other", Uuid::new_v4()), "b", &json!({}))
            .unwrap();
        assert_eq!(store.list(None).unwrap().len(), 2);
        let planned = store.list(Some("self_planned")).unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].name, "a");
    }
}
