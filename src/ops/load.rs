//! Loading declaration files from disk.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::declaration::LibraryDeclaration;
use crate::resolver::ResolveError;
use crate::util::diagnostic::suggestions;
use crate::util::fs::discover_declaration_files;
use crate::util::Diagnostic;

/// Declarations read from a directory, in file order.
#[derive(Debug, Clone, Default)]
pub struct LoadedDeclarations {
    /// Files that were parsed
    pub files: Vec<PathBuf>,
    pub declarations: Vec<LibraryDeclaration>,
    /// Skipped or empty files
    pub notices: Vec<Diagnostic>,
}

/// Read every declaration file in `dir` matching `pattern`.
///
/// A file that cannot be read is skipped with a warning. A file that is not
/// a valid JSON array of declarations aborts loading.
pub fn load_declarations(dir: &Path, pattern: &str, recursive: bool) -> Result<LoadedDeclarations> {
    let paths = discover_declaration_files(dir, pattern, recursive)?;
    let mut loaded = LoadedDeclarations::default();

    if paths.is_empty() {
        loaded.notices.push(
            Diagnostic::warning(format!(
                "no declaration files matching `{}` in {}",
                pattern,
                dir.display()
            ))
            .with_suggestion(suggestions::NO_DECLARATIONS),
        );
    }

    for path in paths {
        tracing::debug!("reading {}", path.display());

        let Some(contents) = read_declaration_file(&path, &mut loaded.notices) else {
            continue;
        };

        let declarations = parse_declarations(&path, &contents)?;
        if declarations.is_empty() {
            loaded.notices.push(
                Diagnostic::note(format!("declaration file {} is empty", path.display()))
                    .with_location(&path),
            );
        } else {
            tracing::info!("parsing {} ({} libraries)", path.display(), declarations.len());
        }

        loaded.declarations.extend(declarations);
        loaded.files.push(path);
    }

    Ok(loaded)
}

/// Raw bytes of a declaration file, or `None` with a warning when it cannot
/// be read.
fn read_declaration_file(path: &Path, notices: &mut Vec<Diagnostic>) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            notices.push(
                Diagnostic::warning(format!("cannot open declaration file, ignoring: {}", e))
                    .with_location(path),
            );
            None
        }
    }
}

/// Parse one file's contents. Bytes that are not UTF-8 are malformed.
pub fn parse_declarations(path: &Path, contents: &[u8]) -> Result<Vec<LibraryDeclaration>, ResolveError> {
    serde_json::from_slice(contents).map_err(|source| ResolveError::MalformedDeclarations {
        file: path.to_path_buf(),
        source,
    })
}
