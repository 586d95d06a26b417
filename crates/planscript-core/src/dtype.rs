//! DataType and DtypeRegistry for declared slot types.
//!
//! Every placeholder slot declares a [`DataType`]. Declarations arrive either
//! as an already-resolved kind or as an alias string (`"int"`, `"str"`, ...);
//! the [`DtypeRegistry`] resolves aliases to concrete kinds. Names it does not
//! know pass through as [`DataType::Unresolved`] and are rejected the first
//! time something asks for the concrete kind.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::value::Value;

/// A concrete value kind a slot can declare.
///
/// Integer and floating point aliases all resolve to [`DataType::Decimal`]:
/// numbers are arbitrary-precision decimals so repeated arithmetic through
/// callables does not accumulate rounding drift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DataType {
    /// Text.
    Text,
    /// Arbitrary-precision decimal number.
    Decimal,
    /// Boolean.
    Bool,
    /// Meta-kind used inside invocation templates: the slot holds an
    /// expression to evaluate, never a concrete value.
    Expression,
    /// A declared name that no alias resolved.
    Unresolved(String),
}

/// Built-in aliases pre-registered on every [`DtypeRegistry`].
const BUILTIN_ALIASES: [(&str, DataType); 7] = [
    ("str", DataType::Text),
    ("text", DataType::Text),
    ("int", DataType::Decimal),
    ("float", DataType::Decimal),
    ("decimal", DataType::Decimal),
    ("bool", DataType::Bool),
    ("expression", DataType::Expression),
];

impl DataType {
    /// Resolves a declared type name using the built-in alias table.
    ///
    /// Unknown names come back as [`DataType::Unresolved`]; see
    /// [`DtypeRegistry::resolve`] for registries with custom aliases.
    pub fn resolve(name: &str) -> DataType {
        BUILTIN_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, dtype)| dtype.clone())
            .unwrap_or_else(|| DataType::Unresolved(name.to_string()))
    }

    /// The canonical spelling used for display and serialization.
    pub fn canonical_name(&self) -> &str {
        match self {
            DataType::Text => "str",
            DataType::Decimal => "decimal",
            DataType::Bool => "bool",
            DataType::Expression => "expression",
            DataType::Unresolved(name) => name,
        }
    }

    /// Returns `self` if it is a concrete kind.
    ///
    /// Returns [`CoreError::UnknownType`] for unresolved names.
    pub fn materialize(&self) -> Result<&DataType, CoreError> {
        match self {
            DataType::Unresolved(name) => Err(CoreError::UnknownType { name: name.clone() }),
            resolved => Ok(resolved),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, DataType::Unresolved(_))
    }

    /// Whether a concrete runtime value conforms to this kind.
    ///
    /// Expression slots accept no concrete value; neither do unresolved ones.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (DataType::Text, Value::Text(_))
                | (DataType::Decimal, Value::Number(_))
                | (DataType::Bool, Value::Bool(_))
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl From<&str> for DataType {
    fn from(name: &str) -> Self {
        DataType::resolve(name)
    }
}

impl From<String> for DataType {
    fn from(name: String) -> Self {
        DataType::resolve(&name)
    }
}

impl From<DataType> for String {
    fn from(dtype: DataType) -> Self {
        dtype.canonical_name().to_string()
    }
}

/// Registry of type aliases, resolving declared names to [`DataType`]s.
///
/// On construction the registry pre-registers the built-in aliases:
/// - `str`, `text` = Text
/// - `int`, `float`, `decimal` = Decimal
/// - `bool` = Bool
/// - `expression` = Expression
#[derive(Debug, Clone)]
pub struct DtypeRegistry {
    aliases: HashMap<String, DataType>,
}

impl DtypeRegistry {
    /// Creates a registry with the built-in aliases pre-registered.
    pub fn new() -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .map(|(alias, dtype)| (alias.to_string(), dtype.clone()))
            .collect();
        DtypeRegistry { aliases }
    }

    /// Registers an additional alias for a resolved kind.
    ///
    /// Returns [`CoreError::DuplicateAlias`] if the name is already known and
    /// [`CoreError::UnknownType`] if `dtype` is itself unresolved.
    pub fn register_alias(&mut self, name: &str, dtype: DataType) -> Result<(), CoreError> {
        if self.aliases.contains_key(name) {
            return Err(CoreError::DuplicateAlias {
                name: name.to_string(),
            });
        }
        dtype.materialize()?;
        self.aliases.insert(name.to_string(), dtype);
        Ok(())
    }

    /// Resolves a declared name. Unknown names pass through unresolved.
    pub fn resolve(&self, name: &str) -> DataType {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| DataType::Unresolved(name.to_string()))
    }

    /// Re-resolves an unresolved name against this registry's aliases.
    /// Resolved kinds come back unchanged.
    pub fn rebind(&self, dtype: &DataType) -> DataType {
        match dtype {
            DataType::Unresolved(name) => self.resolve(name),
            resolved => resolved.clone(),
        }
    }
}

impl Default for DtypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
