//! Resolution error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::resolver::Stage;
use crate::util::diagnostic::Diagnostic;

/// Error during resolution of library declarations.
///
/// Every variant is fatal: configuration errors are human-authored mistakes
/// and are never retried or downgraded.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("library `{library}`: {reason}")]
    #[diagnostic(code(libcfg::schema))]
    Schema { library: String, reason: String },

    #[error("library `{library}` is already declared with different fields")]
    #[diagnostic(
        code(libcfg::inconsistent_redeclaration),
        help("make every declaration of `{library}` identical, or rename one of them")
    )]
    InconsistentRedeclaration {
        library: String,
        differences: Vec<String>,
    },

    #[error("library `{library}`: {reason}")]
    #[diagnostic(code(libcfg::invalid_combination))]
    InvalidCombination { library: String, reason: String },

    #[error("{module}: revision {revision} already exists")]
    #[diagnostic(code(libcfg::duplicate_revision))]
    DuplicateRevision { module: String, revision: u32 },

    #[error("{module}: revision {revision} has the same file `{filename}` as revision {adjacent}")]
    #[diagnostic(
        code(libcfg::spurious_revision_bump),
        help("only bump `rev_num` when the module ships in a different file")
    )]
    SpuriousRevisionBump {
        module: String,
        revision: u32,
        adjacent: u32,
        filename: String,
    },

    #[error("{module}: skipped revisions between {newer} and {older}")]
    #[diagnostic(code(libcfg::revision_gap))]
    RevisionGap {
        module: String,
        newer: u32,
        older: u32,
    },

    #[error("{module}: statically built modules allow one revision, found {count}")]
    #[diagnostic(code(libcfg::too_many_static_revisions))]
    TooManyStaticRevisions { module: String, count: usize },

    #[error("unknown {what} `{value}`")]
    #[diagnostic(code(libcfg::unknown_enum_value))]
    UnknownEnumValue {
        what: &'static str,
        value: String,
        expected: Vec<&'static str>,
    },

    #[error("{module}: no revision is built")]
    #[diagnostic(code(libcfg::no_built_revision))]
    NoBuiltRevision { module: String },

    #[error("failed to parse declarations in {}", file.display())]
    #[diagnostic(code(libcfg::malformed_declarations))]
    MalformedDeclarations {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("resolver is at stage {actual}, expected {expected}")]
    #[diagnostic(code(libcfg::stage_order))]
    StageOrder { expected: Stage, actual: Stage },
}

impl ResolveError {
    pub(crate) fn schema(library: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolveError::Schema {
            library: library.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(library: impl Into<String>, reason: impl Into<String>) -> Self {
        ResolveError::InvalidCombination {
            library: library.into(),
            reason: reason.into(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ResolveError::InconsistentRedeclaration { differences, .. } => {
                let mut diag = diag;
                for field in differences {
                    diag = diag.with_context(format!("`{}` differs", field));
                }
                diag.with_suggestion("Make every declaration of the library identical")
            }

            ResolveError::SpuriousRevisionBump { revision, adjacent, .. } => diag
                .with_suggestion(format!(
                    "Ship revision {} in a different file than revision {}",
                    revision, adjacent
                ))
                .with_suggestion("Or drop the new revision if nothing changed"),

            ResolveError::RevisionGap { newer, older, .. } => diag.with_suggestion(format!(
                "Declare the revisions between {} and {}",
                older, newer
            )),

            ResolveError::TooManyStaticRevisions { .. } => diag
                .with_suggestion("Build the module as a shared library to keep older revisions"),

            ResolveError::UnknownEnumValue { expected, .. } => {
                diag.with_context(format!("expected one of: {}", expected.join(", ")))
            }

            ResolveError::MalformedDeclarations { file, source } => diag
                .with_location(file)
                .with_context(source.to_string()),

            ResolveError::InvalidCombination { reason, .. } if reason.contains("STATIC_BUILD_STUB") => {
                diag.with_suggestion("Use STATIC_BUILD_VIRTUAL_STUB for libraries with amdb_info")
            }

            _ => diag,
        }
    }
}
