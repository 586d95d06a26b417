//! Placeholder slots and contracts.
//!
//! A [`PlaceholderContract`] describes the full parameter or return shape of
//! a callable or program: named, typed, documented slots plus an optional
//! "extras" slot for an open map of uniformly typed additional values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dtype::{DataType, DtypeRegistry};
use crate::error::CoreError;

/// One named, typed, documented slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderDefinition {
    pub dtype: DataType,
    pub description: String,
}

impl PlaceholderDefinition {
    pub fn new(dtype: impl Into<DataType>, description: impl Into<String>) -> Self {
        PlaceholderDefinition {
            dtype: dtype.into(),
            description: description.into(),
        }
    }

    /// Like [`new`](Self::new), resolving `dtype` through `registry` so that
    /// custom aliases apply.
    pub fn resolve_with(registry: &DtypeRegistry, dtype: &str, description: impl Into<String>) -> Self {
        PlaceholderDefinition {
            dtype: registry.resolve(dtype),
            description: description.into(),
        }
    }
}

/// The "extras" slot: additional names beyond the declared placeholders are
/// accepted as long as their values conform to `dtype`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderExtras {
    pub dtype: DataType,
    pub description: String,
}

/// Declared slots by name, in display order.
pub type Placeholders = IndexMap<String, PlaceholderDefinition>;

/// The full shape of a callable's parameters or returns.
///
/// Lookup is by name; insertion order is kept for display and prompts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceholderContract {
    pub placeholders: Placeholders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<PlaceholderExtras>,
}

impl PlaceholderContract {
    /// A closed contract over the given slots.
    pub fn new(placeholders: Placeholders) -> Self {
        PlaceholderContract {
            placeholders,
            extras: None,
        }
    }

    /// Opens the contract to additional values of one uniform type.
    pub fn with_extras(mut self, dtype: impl Into<DataType>, description: impl Into<String>) -> Self {
        self.extras = Some(PlaceholderExtras {
            dtype: dtype.into(),
            description: description.into(),
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&PlaceholderDefinition> {
        self.placeholders.get(name)
    }

    pub fn allows_extras(&self) -> bool {
        self.extras.is_some()
    }

    /// Declared type for `name`, falling back to the extras type.
    pub fn slot_type(&self, name: &str) -> Option<&DataType> {
        match (self.placeholders.get(name), &self.extras) {
            (Some(slot), _) => Some(&slot.dtype),
            (None, Some(extras)) => Some(&extras.dtype),
            (None, None) => None,
        }
    }

    /// Copy with every unresolved type name re-resolved through `registry`.
    pub fn resolve_in(&self, registry: &DtypeRegistry) -> PlaceholderContract {
        PlaceholderContract {
            placeholders: self
                .placeholders
                .iter()
                .map(|(name, slot)| {
                    (
                        name.clone(),
                        PlaceholderDefinition {
                            dtype: registry.rebind(&slot.dtype),
                            description: slot.description.clone(),
                        },
                    )
                })
                .collect(),
            extras: self.extras.as_ref().map(|extras| PlaceholderExtras {
                dtype: registry.rebind(&extras.dtype),
                description: extras.description.clone(),
            }),
        }
    }

    /// Checks that every declared type (and the extras type) resolved.
    ///
    /// Contracts built from free-form declarations run this at construction
    /// so unknown type names are rejected before any value is bound.
    pub fn ensure_resolved(&self) -> Result<(), CoreError> {
        for placeholder in self.placeholders.values() {
            placeholder.dtype.materialize()?;
        }
        if let Some(extras) = &self.extras {
            extras.dtype.materialize()?;
        }
        Ok(())
    }
}
