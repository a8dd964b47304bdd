//! Flag-conditioned declaration values.
//!
//! A declaration field may either hold a literal value or a map from flag
//! name to value with a mandatory `DEFAULT` entry:
//!
//! ```json
//! "build": { "USES_FOO_SHARED": "SHARED_BUILD_STRIP", "DEFAULT": "STATIC_BUILD_NO_STRIP" }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::env::Environment;

/// Key of the fallback entry in a flag map.
pub const DEFAULT_KEY: &str = "DEFAULT";

/// A flag map has no `DEFAULT` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("flag map has no `DEFAULT` entry")]
pub struct MissingDefault;

/// A literal value or a flag-keyed set of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionalValue<T> {
    /// Used as-is.
    Literal(T),
    /// First entry whose flag is set wins, else `DEFAULT`.
    Flags(IndexMap<String, T>),
}

impl<T> ConditionalValue<T> {
    /// Resolve against the environment.
    ///
    /// Flag entries are tried in declaration order; `DEFAULT` is only used
    /// when none of them is set. A flag map without `DEFAULT` is rejected
    /// even when another entry would match.
    pub fn resolve(&self, env: &Environment) -> Result<&T, MissingDefault> {
        match self {
            ConditionalValue::Literal(value) => Ok(value),
            ConditionalValue::Flags(map) => {
                let default = map
                    .iter()
                    .find(|(k, _)| k.trim() == DEFAULT_KEY)
                    .map(|(_, v)| v)
                    .ok_or(MissingDefault)?;

                let selected = map
                    .iter()
                    .filter(|(k, _)| k.trim() != DEFAULT_KEY)
                    .find(|(k, _)| env.is_set(k))
                    .map(|(_, v)| v);

                Ok(selected.unwrap_or(default))
            }
        }
    }

    /// Whether this is a flag map.
    pub fn is_conditional(&self) -> bool {
        matches!(self, ConditionalValue::Flags(_))
    }
}

impl<T> From<T> for ConditionalValue<T> {
    fn from(value: T) -> Self {
        ConditionalValue::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(entries: &[(&str, &str)]) -> ConditionalValue<String> {
        ConditionalValue::Flags(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_literal_is_unchanged() {
        let value = ConditionalValue::from("x".to_string());
        assert_eq!(value.resolve(&Environment::new()).unwrap(), "x");
        assert!(!value.is_conditional());
    }

    #[test]
    fn test_only_second_flag_set() {
        let value = flags(&[("A", "a"), ("B", "b"), ("DEFAULT", "d")]);
        let env = Environment::new().with_flag("A", false).with_flag("B", true);
        assert_eq!(value.resolve(&env).unwrap(), "b");
    }

    #[test]
    fn test_first_matching_flag_wins() {
        let value = flags(&[("A", "a"), ("B", "b"), ("DEFAULT", "d")]);
        let env = Environment::new().with_flag("A", true).with_flag("B", true);
        assert_eq!(value.resolve(&env).unwrap(), "a");
    }

    #[test]
    fn test_falls_back_to_default() {
        let value = flags(&[("A", "a"), ("B", "b"), ("DEFAULT", "d")]);
        assert_eq!(value.resolve(&Environment::new()).unwrap(), "d");
    }

    #[test]
    fn test_default_position_is_irrelevant() {
        let value = flags(&[("DEFAULT", "d"), ("A", "a")]);
        let env = Environment::new().with_flag("a", true);
        assert_eq!(value.resolve(&env).unwrap(), "a");
    }

    #[test]
    fn test_missing_default() {
        let value = flags(&[("A", "a")]);
        let env = Environment::new().with_flag("A", true);
        assert_eq!(value.resolve(&env), Err(MissingDefault));
    }

    #[test]
    fn test_deserialize_preserves_order() {
        let value: ConditionalValue<String> =
            serde_json::from_str(r#"{"Z": "z", "A": "a", "DEFAULT": "d"}"#).unwrap();
        let env = Environment::new().with_flag("Z", true).with_flag("A", true);
        assert_eq!(value.resolve(&env).unwrap(), "z");

        let literal: ConditionalValue<String> = serde_json::from_str(r#""SHARED_NO_BUILD""#).unwrap();
        assert_eq!(literal, ConditionalValue::Literal("SHARED_NO_BUILD".to_string()));
    }
}
