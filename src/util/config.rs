//! Configuration file support for libcfg.
//!
//! libcfg reads two configuration file locations:
//! - Global: `~/.libcfg/config.toml` - User-wide defaults
//! - Project: `.libcfg/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::env::Environment;
use crate::resolver::ResolveOptions;

/// Default glob pattern for declaration files.
pub const DEFAULT_PATTERN: &str = "*.json";

/// libcfg configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where declarations are read from
    pub input: InputConfig,

    /// Environment flags
    pub env: EnvConfig,

    /// Optional checks
    pub checks: ChecksConfig,
}

/// Declaration discovery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding the declaration files
    pub dir: Option<PathBuf>,

    /// File name pattern (default `*.json`)
    pub pattern: Option<String>,

    /// Descend into subdirectories
    #[serde(default)]
    pub recursive: bool,
}

impl InputConfig {
    /// Effective file pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(DEFAULT_PATTERN)
    }
}

/// Flags the build system would normally provide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub flags: Environment,
}

/// Checks that are off unless enabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Every module needs at least one revision that is built
    #[serde(default)]
    pub require_built_revision: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Input settings
        if other.input.dir.is_some() {
            self.input.dir = other.input.dir;
        }
        if other.input.pattern.is_some() {
            self.input.pattern = other.input.pattern;
        }
        if other.input.recursive {
            self.input.recursive = true;
        }

        // Flags merge by name
        self.env.flags.merge(&other.env.flags);

        if other.checks.require_built_revision {
            self.checks.require_built_revision = true;
        }
    }

    /// Resolver options from the `[checks]` table.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            require_built_revision: self.checks.require_built_revision,
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.libcfg/config.toml)
/// 2. Global config (~/.libcfg/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    // Project config overrides global
    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global libcfg config directory (~/.libcfg).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".libcfg"))
}

/// Get the global config path (~/.libcfg/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.libcfg/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".libcfg").join("config.toml")
}
