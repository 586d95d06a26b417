//! Storage-layer types for callable identity and metadata.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a stored callable: an implementation-defined type
/// discriminator plus the callable's instance identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallableKey {
    pub type_prefix: String,
    pub instance_id: Uuid,
}

impl CallableKey {
    pub fn new(type_prefix: impl Into<String>, instance_id: Uuid) -> Self {
        CallableKey {
            type_prefix: type_prefix.into(),
            instance_id,
        }
    }
}

impl fmt::Display for CallableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_prefix, self.instance_id)
    }
}

/// Summary of a stored callable (for listing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableSummary {
    pub key: CallableKey,
    /// The callable's public name.
    pub name: String,
    /// Hex blake3 hash of the stored payload.
    pub payload_hash: String,
}
