//! Public description of a callable, as shown to planners.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::placeholder::{PlaceholderContract, Placeholders};

/// Name, documentation and parameter/return slots of a callable.
///
/// Names must be unique within a run state; uniqueness is enforced when the
/// run state builds its name index, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Placeholders,
    pub allow_extra_parameters: bool,
    pub returns: Placeholders,
}

impl CallableDefinition {
    /// Builds a definition from parameter and return contracts.
    ///
    /// `allow_extra_parameters` follows the parameter contract's extras slot.
    pub fn from_contracts(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: &PlaceholderContract,
        returns: &PlaceholderContract,
    ) -> Self {
        CallableDefinition {
            name: name.into(),
            description: description.into(),
            parameters: parameters.placeholders.clone(),
            allow_extra_parameters: parameters.allows_extras(),
            returns: returns.placeholders.clone(),
        }
    }
}

/// One-line signature, e.g. `summation(a: decimal, b: decimal, ...) -> (sum: decimal)`.
impl fmt::Display for CallableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params: Vec<String> = self
            .parameters
            .iter()
            .map(|(name, p)| format!("{}: {}", name, p.dtype))
            .collect();
        if self.allow_extra_parameters {
            params.push("...".to_string());
        }
        let returns: Vec<String> = self
            .returns
            .iter()
            .map(|(name, p)| format!("{}: {}", name, p.dtype))
            .collect();
        write!(f, "{}({}) -> ({})", self.name, params.join(", "), returns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::PlaceholderDefinition;
    use indexmap::IndexMap;

    #[test]
    fn signature_display() {
        let params = PlaceholderContract::new(IndexMap::from([
            ("a".to_string(), PlaceholderDefinition::new("int", "First")),
            ("b".to_string(), PlaceholderDefinition::new("int", "Second")),
        ]))
        .with_extras("int", "More terms");
        let returns = PlaceholderContract::new(IndexMap::from([(
            "sum".to_string(),
            PlaceholderDefinition::new("int", "Total"),
        )]));

        let def = CallableDefinition::from_contracts("summation", "Adds numbers", &params, &returns);
        assert!(def.allow_extra_parameters);
        assert_eq!(
            def.to_string(),
            "summation(a: decimal, b: decimal, ...) -> (sum: decimal)"
        );
    }
}
