//! Resolution - the validated output of a resolver run.
//!
//! Once created, a Resolution is read-only. Code generators consume it to
//! emit linkage tables and the module catalog.

use serde::Serialize;

use crate::core::env::Environment;
use crate::core::library::ResolvedLibrary;
use crate::registry::{LibraryRegistry, LinkageFacts, ModuleRegistry};
use crate::util::hash::Fingerprint;
use crate::util::diagnostic::{Diagnostic, Severity};

/// Registries, linkage facts and notices of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Flags the resolution was computed against
    pub env: Environment,
    pub libraries: LibraryRegistry,
    pub modules: ModuleRegistry,
    pub linkage: LinkageFacts,
    /// Informational notices, in the order they were raised
    pub notices: Vec<Diagnostic>,
}

/// Canonical view used for fingerprinting and JSON output.
#[derive(Serialize)]
pub struct Snapshot<'a> {
    pub libraries: Vec<&'a ResolvedLibrary>,
    pub modules: &'a ModuleRegistry,
    pub linkage: &'a LinkageFacts,
}

impl Resolution {
    /// Borrow the canonical snapshot.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            libraries: self.libraries.iter().collect(),
            modules: &self.modules,
            linkage: &self.linkage,
        }
    }

    /// SHA-256 of the canonical snapshot.
    ///
    /// Equal declarations and flags always produce the same fingerprint;
    /// notices are not part of it.
    pub fn fingerprint(&self) -> String {
        let snapshot = self.snapshot();
        let mut fp = Fingerprint::new();
        let hashed = fp
            .update_json("libraries", &snapshot.libraries)
            .and_then(|fp| fp.update_json("modules", snapshot.modules))
            .and_then(|fp| fp.update_json("linkage", snapshot.linkage));
        if let Err(e) = hashed {
            // only reachable with a broken Serialize impl
            tracing::warn!("failed to serialize resolution for fingerprinting: {}", e);
        }
        fp.finish()
    }

    /// Number of notices at or above warning level.
    pub fn warning_count(&self) -> usize {
        self.notices
            .iter()
            .filter(|n| matches!(n.severity, Severity::Error | Severity::Warning))
            .count()
    }
}
