//! Build environment flags.
//!
//! The environment is a set of named boolean flags supplied once by the
//! surrounding build tool. Resolution only reads it; derived linkage flags
//! are returned separately (see [`crate::registry::LinkageFacts`]).

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Flag that enables production of shared artifacts.
pub const GEN_SHARED_LIBS: &str = "GEN_SHARED_LIBS";

/// Flag marking a non-mobile target.
pub const USES_NON_MOBILE: &str = "USES_NON_MOBILE";

/// Flag enabling the private build variant.
pub const IS_BUILD_INTERNAL: &str = "IS_BUILD_INTERNAL";

/// Flag enabling island builds.
pub const USES_AUDIO_IN_ISLAND: &str = "USES_AUDIO_IN_ISLAND";

/// Flag marking a standalone framework compilation.
pub const SPF_FWK_COMPILATION: &str = "SPF_FWK_COMPILATION";

/// Named boolean flags of the build environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    flags: IndexMap<String, bool>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Environment::default()
    }

    /// Set a flag, returning the environment for chaining.
    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.set(name, value);
        self
    }

    /// Set a flag to the given value.
    pub fn set(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    /// Parse a `NAME` or `NAME=value` definition and set it.
    ///
    /// A bare name sets the flag to `true`.
    pub fn define(&mut self, definition: &str) -> Result<(), String> {
        let (name, value) = match definition.split_once('=') {
            Some((name, value)) => (name.trim(), parse_bool(value.trim())?),
            None => (definition.trim(), true),
        };
        if name.is_empty() {
            return Err(format!("empty flag name in `{}`", definition));
        }
        self.set(name, value);
        Ok(())
    }

    /// Check whether a flag is set to `true`.
    ///
    /// The exact upper-case and lower-case spellings of `name` are both
    /// consulted; declarations historically use either.
    pub fn is_set(&self, name: &str) -> bool {
        let name = name.trim();
        self.flags.get(&name.to_uppercase()).copied().unwrap_or(false)
            || self.flags.get(&name.to_lowercase()).copied().unwrap_or(false)
    }

    /// Iterate over all flags in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of defined flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no flags are defined.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Mode switches derived from the flags.
    pub fn modes(&self) -> Modes {
        Modes {
            shared_artifacts: self.is_set(GEN_SHARED_LIBS),
            non_mobile: self.is_set(USES_NON_MOBILE),
            private_variant: self.is_set(IS_BUILD_INTERNAL),
            island: self.is_set(USES_AUDIO_IN_ISLAND),
            standalone_framework: self.is_set(SPF_FWK_COMPILATION),
        }
    }

    /// Merge another environment into this one (other takes precedence).
    pub fn merge(&mut self, other: &Environment) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<&str> = self
            .flags
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| k.as_str())
            .collect();
        write!(f, "[{}]", set.join(", "))
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("invalid flag value `{}`", value)),
    }
}

/// Mode switches referenced directly by the build-kind policy and the
/// catalog views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Modes {
    /// Shared artifacts are produced (`GEN_SHARED_LIBS`).
    pub shared_artifacts: bool,
    /// Target is non-mobile (`USES_NON_MOBILE`).
    pub non_mobile: bool,
    /// Private build variant (`IS_BUILD_INTERNAL`).
    pub private_variant: bool,
    /// Island builds (`USES_AUDIO_IN_ISLAND`).
    pub island: bool,
    /// Standalone framework compilation (`SPF_FWK_COMPILATION`).
    pub standalone_framework: bool,
}
