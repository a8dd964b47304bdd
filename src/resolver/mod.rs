//! Declaration resolution.
//!
//! The resolver turns raw library declarations into a validated
//! [`Resolution`]. It runs in fixed stages:
//!
//! ```text
//! Ingest -> BuildRegistryPopulated -> ModuleRegistryPopulated -> Validated
//! ```
//!
//! The first error aborts the run; a partially populated registry is never
//! handed out. The resolver is pure - all I/O happens before ingestion.

pub mod errors;
pub mod resolution;

pub use errors::ResolveError;
pub use resolution::{Resolution, Snapshot};

use std::fmt;
use std::mem;

use serde::Serialize;

use crate::core::declaration::LibraryDeclaration;
use crate::core::env::Environment;
use crate::registry::{module_from_declaration, LibraryRegistry, LinkageFacts, ModuleRegistry, Registration};
use crate::util::Diagnostic;

/// Resolver progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Ingest,
    BuildRegistryPopulated,
    ModuleRegistryPopulated,
    Validated,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Ingest => "ingest",
            Stage::BuildRegistryPopulated => "build-registry-populated",
            Stage::ModuleRegistryPopulated => "module-registry-populated",
            Stage::Validated => "validated",
        };
        f.write_str(name)
    }
}

/// Optional checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Reject modules whose every revision is `SHARED_NO_BUILD`
    pub require_built_revision: bool,
}

/// Staged resolver for one set of declarations.
#[derive(Debug)]
pub struct Resolver {
    env: Environment,
    options: ResolveOptions,
    stage: Stage,
    declarations: Vec<LibraryDeclaration>,
    /// Declarations that added a new library, by index
    inserted: Vec<usize>,
    libraries: LibraryRegistry,
    modules: ModuleRegistry,
    notices: Vec<Diagnostic>,
    logged: usize,
}

impl Resolver {
    /// Create a resolver for the given flags.
    pub fn new(env: Environment, options: ResolveOptions) -> Self {
        Resolver {
            env,
            options,
            stage: Stage::Ingest,
            declarations: Vec::new(),
            inserted: Vec::new(),
            libraries: LibraryRegistry::new(),
            modules: ModuleRegistry::new(),
            notices: Vec::new(),
            logged: 0,
        }
    }

    /// Resolve declarations in one go.
    pub fn run(
        env: Environment,
        options: ResolveOptions,
        declarations: impl IntoIterator<Item = LibraryDeclaration>,
    ) -> Result<Resolution, ResolveError> {
        let mut resolver = Resolver::new(env, options);
        resolver.ingest(declarations)?;
        resolver.populate_libraries()?;
        resolver.populate_modules()?;
        resolver.validate()
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Notices raised so far.
    pub fn notices(&self) -> &[Diagnostic] {
        &self.notices
    }

    /// Queue declarations. May be called repeatedly before libraries are
    /// populated; input order is kept.
    pub fn ingest(
        &mut self,
        declarations: impl IntoIterator<Item = LibraryDeclaration>,
    ) -> Result<(), ResolveError> {
        self.expect_stage(Stage::Ingest)?;
        let before = self.declarations.len();
        self.declarations.extend(declarations);
        tracing::debug!("ingested {} declarations", self.declarations.len() - before);
        Ok(())
    }

    /// Resolve every declaration into the library registry.
    pub fn populate_libraries(&mut self) -> Result<(), ResolveError> {
        self.expect_stage(Stage::Ingest)?;
        tracing::debug!("resolving libraries with {}", self.env);

        for (index, decl) in self.declarations.iter().enumerate() {
            let registration = self.libraries.register(decl, &self.env, &mut self.notices);
            flush_notices(&self.notices, &mut self.logged);
            if registration? == Registration::Inserted {
                self.inserted.push(index);
            }
        }

        tracing::info!("resolved {} libraries", self.libraries.len());
        self.stage = Stage::BuildRegistryPopulated;
        Ok(())
    }

    /// Register the module revision of every library with a descriptor.
    ///
    /// Identical re-declarations of a library were already folded into the
    /// first one and contribute no second revision.
    pub fn populate_modules(&mut self) -> Result<(), ResolveError> {
        self.expect_stage(Stage::BuildRegistryPopulated)?;

        for &index in &self.inserted {
            let decl = &self.declarations[index];
            let Some(amdb) = decl.amdb() else {
                continue;
            };
            let Some(lib) = self.libraries.get(&decl.lib_name) else {
                continue;
            };

            let module = module_from_declaration(lib, amdb, decl.is_test_module, &mut self.notices);
            let registered = module.and_then(|(id, revision)| {
                self.modules.register(id, revision, &mut self.notices)
            });
            flush_notices(&self.notices, &mut self.logged);
            registered?;
        }

        tracing::info!("registered {} modules", self.modules.len());
        self.stage = Stage::ModuleRegistryPopulated;
        Ok(())
    }

    /// Run the whole-registry checks and hand out the resolution.
    pub fn validate(&mut self) -> Result<Resolution, ResolveError> {
        self.expect_stage(Stage::ModuleRegistryPopulated)?;

        self.modules.check_contiguity()?;
        if self.options.require_built_revision {
            self.modules.check_at_least_one_built()?;
        }

        let linkage = LinkageFacts::collect(&self.libraries, &self.env, &mut self.notices);
        flush_notices(&self.notices, &mut self.logged);
        tracing::debug!(
            "{} shared libraries, {} linkage flags",
            linkage.shared.len(),
            linkage.flags.len()
        );

        self.stage = Stage::Validated;
        self.declarations.clear();
        self.inserted.clear();

        Ok(Resolution {
            env: self.env.clone(),
            libraries: mem::take(&mut self.libraries),
            modules: mem::take(&mut self.modules),
            linkage,
            notices: mem::take(&mut self.notices),
        })
    }

    fn expect_stage(&self, expected: Stage) -> Result<(), ResolveError> {
        if self.stage != expected {
            return Err(ResolveError::StageOrder {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }
}

/// Log the notices raised since the last flush.
fn flush_notices(notices: &[Diagnostic], logged: &mut usize) {
    for notice in &notices[*logged..] {
        notice.log();
    }
    *logged = notices.len();
}
