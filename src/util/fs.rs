//! Filesystem utilities.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use walkdir::WalkDir;

/// Find declaration files in `dir` whose name matches `pattern`.
///
/// With `recursive` set, subdirectories are searched too and the pattern is
/// matched against file names only. Results are sorted by path so the
/// declaration order does not depend on directory iteration order.
pub fn discover_declaration_files(dir: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("declaration directory not found: {}", dir.display());
    }

    let mut results = if recursive {
        walk_matching(dir, pattern)?
    } else {
        glob_files(dir, &[pattern.to_string()])?
    };

    results.sort();
    results.dedup();
    Ok(results)
}

/// Find files matching glob patterns relative to a base directory.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        // Make pattern absolute by joining with base
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

fn walk_matching(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = Pattern::new(pattern).with_context(|| format!("invalid glob pattern: {}", pattern))?;
    let mut results = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && pattern.matches(&entry.file_name().to_string_lossy()) {
            results.push(entry.into_path());
        }
    }

    Ok(results)
}
