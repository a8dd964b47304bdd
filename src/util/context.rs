//! Global context for libcfg operations.
//!
//! Provides centralized access to configuration, paths, and output settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{self, Config};

/// Directory searched for declarations when nothing else is configured.
pub const DEFAULT_DECLARATION_DIR: &str = "libs_cfg";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Merged global and project configuration
    config: Config,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a context for the current directory, loading the global and
    /// project configuration files.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at `cwd`.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let project = config::project_config_path(&cwd);
        let config = match config::global_config_path() {
            Some(global) => config::load_config(&global, &project),
            None => Config::load_or_default(&project),
        };

        GlobalContext {
            cwd,
            config,
            verbose: false,
            color: true,
        }
    }

    /// Layer an explicitly named config file on top of the loaded ones.
    pub fn with_config_file(mut self, path: &Path) -> Result<Self> {
        let path = self.resolve_path(path);
        let explicit = Config::load(&path)?;
        self.config.merge(explicit);
        Ok(self)
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Check if colors are enabled.
    pub fn use_color(&self) -> bool {
        self.color
    }

    /// Set color mode.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Directory to read declarations from.
    ///
    /// A command-line override wins over the configured `[input] dir`,
    /// which wins over `./libs_cfg`. Relative paths are taken from the
    /// working directory.
    pub fn declaration_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        let dir = cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.config.input.dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DECLARATION_DIR));
        self.resolve_path(&dir)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_declaration_dir_precedence() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert_eq!(ctx.declaration_dir(None), tmp.path().join("libs_cfg"));
        assert_eq!(
            ctx.declaration_dir(Some(Path::new("cfg"))),
            tmp.path().join("cfg")
        );
    }

    #[test]
    fn test_project_config_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".libcfg");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[input]\ndir = \"decls\"\n").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert_eq!(ctx.declaration_dir(None), tmp.path().join("decls"));
    }

    #[test]
    fn test_explicit_config_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("ci.toml"),
            "[env.flags]\nGEN_SHARED_LIBS = true\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .with_config_file(Path::new("ci.toml"))
            .unwrap();
        assert!(ctx.config().env.flags.is_set("GEN_SHARED_LIBS"));

        let missing = GlobalContext::with_cwd(tmp.path().to_path_buf())
            .with_config_file(Path::new("missing.toml"));
        assert!(missing.is_err());
    }
}
