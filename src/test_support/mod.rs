//! Test utilities for libcfg unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use libcfg::test_support::{declarations, DeclarationDir};
//!
//! #[test]
//! fn test_example() {
//!     let dir = DeclarationDir::new();
//!     dir.add_file("libs.json", &declarations::file(&[declarations::static_library("utils")]));
//!     // resolve dir.path()...
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Temporary directory of declaration files.
///
/// Dropping it removes the directory.
pub struct DeclarationDir {
    tmp: TempDir,
}

impl DeclarationDir {
    pub fn new() -> Self {
        DeclarationDir {
            tmp: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    /// Write a file relative to the directory, creating parents.
    pub fn add_file(&self, rel: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("failed to write declaration file");
        path
    }
}

impl Default for DeclarationDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Assertion helpers for testing.
pub mod assertions {
    use crate::util::diagnostic::{Diagnostic, Severity};

    /// Assert that a result is Err and return the error.
    pub fn assert_err<T: std::fmt::Debug, E>(result: Result<T, E>) -> E {
        match result {
            Ok(v) => panic!("expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    }

    /// Assert that some notice of `severity` mentions `substring`.
    pub fn assert_notice(notices: &[Diagnostic], severity: Severity, substring: &str) {
        assert!(
            notices
                .iter()
                .any(|n| n.severity == severity && n.message.contains(substring)),
            "no {:?} notice containing '{}' in {:?}",
            severity,
            substring,
            notices
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::load::load_declarations;

    #[test]
    fn test_declaration_dir_files() {
        let dir = DeclarationDir::new();
        dir.add_file(
            "nested/libs.json",
            &declarations::file(&[
                declarations::static_library("utils"),
                declarations::decoder("mp3", "0x10", 1, 1),
            ]),
        );

        let loaded = load_declarations(dir.path(), "*.json", true).unwrap();
        assert_eq!(loaded.declarations.len(), 2);
        assert_eq!(loaded.declarations[1].amdb().unwrap().rev_num, Some(1));
    }

    #[test]
    fn test_assertions() {
        use assertions::*;
        use crate::util::diagnostic::{Diagnostic, Severity};

        let err_result: Result<i32, &str> = Err("error");
        assert_eq!(assert_err(err_result), "error");

        let notices = vec![Diagnostic::warning("module 0x10 is also declared as encoder")];
        assert_notice(&notices, Severity::Warning, "also declared");
    }
}
