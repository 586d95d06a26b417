//! SQLite implementation of [`CallableStore`].
//!
//! [`SqliteStore`] persists callables in a single `callables` table with WAL
//! mode, a transaction around every write, and automatic schema migrations.
//! Payloads are stored as JSON TEXT next to their blake3 hash.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;
use crate::hash::{payload_hash, verify_payload};
use crate::traits::CallableStore;
use crate::types::{CallableKey, CallableSummary};

/// SQLite-backed implementation of [`CallableStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    fn parse_instance_id(raw: &str) -> Result<Uuid, StorageError> {
        Uuid::parse_str(raw).map_err(|e| StorageError::IntegrityError {
            reason: format!("malformed instance id '{}': {}", raw, e),
        })
    }
}

impl CallableStore for SqliteStore {
    fn put(&mut self, key: &CallableKey, name: &str, payload: &serde_json::Value) -> Result<(), StorageError> {
        let payload = serde_json::to_string(payload)?;
        let hash = payload_hash(&payload);
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO callables (type_prefix, instance_id, name, payload, payload_hash)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (type_prefix, instance_id) DO UPDATE SET
                 name = excluded.name,
                 payload = excluded.payload,
                 payload_hash = excluded.payload_hash,
                 updated_at = datetime('now')",
            params![key.type_prefix, key.instance_id.to_string(), name, payload, hash],
        )?;
        tx.commit()?;
        debug!(%key, bytes = payload.len(), "stored callable");
        Ok(())
    }

    fn get(&self, key: &CallableKey) -> Result<serde_json::Value, StorageError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT payload, payload_hash FROM callables WHERE type_prefix = ?1 AND instance_id = ?2",
                params![key.type_prefix, key.instance_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (payload, hash) = row.ok_or_else(|| StorageError::NotFound(key.clone()))?;
        if !verify_payload(&payload, &hash) {
            return Err(StorageError::IntegrityError {
                reason: format!("payload hash mismatch for {}", key),
            });
        }
        Ok(serde_json::from_str(&payload)?)
    }

    fn delete(&mut self, key: &CallableKey) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM callables WHERE type_prefix = ?1 AND instance_id = ?2",
            params![key.type_prefix, key.instance_id.to_string()],
        )?;
        if deleted == 0 {
            return Err(StorageError::NotFound(key.clone()));
        }
        tx.commit()?;
        debug!(%key, "deleted callable");
        Ok(())
    }

    fn list(&self, type_prefix: Option<&str>) -> Result<Vec<CallableSummary>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT type_prefix, instance_id, name, payload_hash FROM callables
             WHERE ?1 IS NULL OR type_prefix = ?1
             ORDER BY type_prefix, instance_id",
        )?;
        let rows = stmt.query_map(params![type_prefix], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut result = Vec::new();
        for row in rows {
            let (prefix, instance_id, name, payload_hash) = row?;
            result.push(CallableSummary {
                key: CallableKey::new(prefix, Self::parse_instance_id(&instance_id)?),
                name,
                payload_hash,
            });
        }
        Ok(result)
    }
}
