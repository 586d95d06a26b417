//! Storage for planscript callables.
//!
//! Provides the [`CallableStore`] trait defining the storage contract that
//! all backends implement, plus [`InMemoryStore`] and [`SqliteStore`] as
//! first-class backends.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: CallableKey and CallableSummary
//! - [`traits`]: CallableStore trait definition
//! - [`hash`]: blake3 payload hashing
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: migration setup
//! - [`sqlite`]: SqliteStore implementation

pub mod error;
pub mod hash;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use hash::payload_hash;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::CallableStore;
pub use types::{CallableKey, CallableSummary};
