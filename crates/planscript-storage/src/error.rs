//! Storage error types for planscript-storage.
//!
//! [`StorageError`] covers the failure modes of the storage layer:
//! serialization, database and migration failures, missing entries,
//! integrity violations and restoring a callable from its payload.

use thiserror::Error;

use crate::types::CallableKey;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The SQLite backend reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// No entry is stored under the key.
    #[error("callable not found: {0}")]
    NotFound(CallableKey),

    /// A stored payload does not match its recorded hash, or a stored row
    /// is malformed.
    #[error("integrity error: {reason}")]
    IntegrityError { reason: String },

    /// The payload decoded but could not be turned back into a callable.
    #[error("reconstruction error: {reason}")]
    ReconstructionError { reason: String },
}
