//! Library build registry.
//!
//! Deduplicates library declarations by name. A library may be declared by
//! several files as long as every declaration resolves to the same
//! [`ResolvedLibrary`] and declares the same module.

use indexmap::IndexMap;

use crate::core::build_kind::{resolve_library_build_kind, BuildKind};
use crate::core::declaration::{AmdbDescriptor, IslandValue, LibraryDeclaration};
use crate::core::env::Environment;
use crate::core::library::ResolvedLibrary;
use crate::resolver::ResolveError;
use crate::util::Diagnostic;

/// Outcome of registering a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First declaration of this library.
    Inserted,
    /// Identical re-declaration, nothing changed.
    Duplicate,
}

/// Registered libraries in declaration order.
#[derive(Debug, Clone, Default)]
pub struct LibraryRegistry {
    libraries: IndexMap<String, ResolvedLibrary>,
    /// Module part of the first declaration of each library
    declared_modules: IndexMap<String, DeclaredModule>,
}

/// What a declaration says about the module a library implements.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeclaredModule {
    amdb: Option<AmdbDescriptor>,
    is_test_module: bool,
}

impl DeclaredModule {
    fn of(decl: &LibraryDeclaration) -> Self {
        DeclaredModule {
            amdb: decl.amdb().map(AmdbDescriptor::normalized),
            is_test_module: decl.is_test_module,
        }
    }

    fn differences(&self, other: &DeclaredModule) -> Vec<&'static str> {
        let mut diffs = Vec::new();
        if self.amdb != other.amdb {
            diffs.push("amdb_info");
        }
        if self.is_test_module != other.is_test_module {
            diffs.push("is_test_module");
        }
        diffs
    }
}

impl LibraryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        LibraryRegistry::default()
    }

    /// Resolve a declaration and add it to the registry.
    ///
    /// Informational notices (forced build kinds, identical duplicates) are
    /// appended to `notices`.
    pub fn register(
        &mut self,
        decl: &LibraryDeclaration,
        env: &Environment,
        notices: &mut Vec<Diagnostic>,
    ) -> Result<Registration, ResolveError> {
        let resolved = resolve_declaration(decl, env, notices)?;
        let module = DeclaredModule::of(decl);

        if let Some(existing) = self.libraries.get(&resolved.name) {
            let mut differences = existing.differences(&resolved);
            if let Some(declared) = self.declared_modules.get(&resolved.name) {
                differences.extend(declared.differences(&module));
            }
            if !differences.is_empty() {
                return Err(ResolveError::InconsistentRedeclaration {
                    library: resolved.name,
                    differences: differences.into_iter().map(str::to_string).collect(),
                });
            }
            notices.push(Diagnostic::note(format!(
                "library `{}` is declared more than once with identical fields",
                resolved.name
            )));
            return Ok(Registration::Duplicate);
        }

        tracing::debug!(
            "lib {}: {} v{}.{}",
            resolved.name,
            resolved.build,
            resolved.major,
            resolved.minor
        );
        self.declared_modules.insert(resolved.name.clone(), module);
        self.libraries.insert(resolved.name.clone(), resolved);
        Ok(Registration::Inserted)
    }

    /// Look up a library by name.
    pub fn get(&self, name: &str) -> Option<&ResolvedLibrary> {
        self.libraries.get(name.trim())
    }

    /// Iterate over libraries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedLibrary> {
        self.libraries.values()
    }

    /// Number of registered libraries.
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Check if a library is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.libraries.contains_key(name.trim())
    }
}

/// Apply conditional values and build policy to one declaration.
pub fn resolve_declaration(
    decl: &LibraryDeclaration,
    env: &Environment,
    notices: &mut Vec<Diagnostic>,
) -> Result<ResolvedLibrary, ResolveError> {
    let name = decl.lib_name.trim().to_string();
    if name.is_empty() {
        return Err(ResolveError::schema("<unnamed>", "lib_name cannot be empty"));
    }
    let has_amdb = decl.amdb().is_some();

    let declared = match &decl.build {
        Some(build) => {
            let raw = build.resolve(env).map_err(|_| {
                ResolveError::schema(&name, "the build flag map has no DEFAULT entry")
            })?;
            if raw.trim().is_empty() {
                return Err(ResolveError::schema(&name, "build cannot be empty"));
            }
            raw.parse::<BuildKind>()?
        }
        None => BuildKind::default(),
    };

    let modes = env.modes();
    let resolution = resolve_library_build_kind(declared, has_amdb, modes.shared_artifacts);
    if resolution.forced_no_build {
        notices.push(Diagnostic::note(format!(
            "library `{}` with build={} has no amdb_info and is not built without shared libraries",
            name, declared
        )));
    }
    let build = resolution.kind;

    if has_amdb && build == BuildKind::StaticStub {
        return Err(ResolveError::invalid(
            &name,
            "has amdb_info but is built as STATIC_BUILD_STUB",
        ));
    }

    let island = match &decl.island {
        Some(island) => island
            .resolve(env)
            .map_err(|_| ResolveError::schema(&name, "the island flag map has no DEFAULT entry"))?
            .normalized(),
        None => IslandValue::default(),
    };

    let (major, minor) = if build.is_shared() {
        let major = decl.lib_major_ver.ok_or_else(|| {
            ResolveError::schema(&name, format!("lib_major_ver is mandatory for {}", build))
        })?;
        let minor = decl.lib_minor_ver.ok_or_else(|| {
            ResolveError::schema(&name, format!("lib_minor_ver is mandatory for {}", build))
        })?;
        (major, minor)
    } else {
        (decl.lib_major_ver.unwrap_or(0), decl.lib_minor_ver.unwrap_or(0))
    };

    let pkg_info = decl.pkg_info.as_ref().map(|p| p.trim().to_string());
    let security_info = decl.security_info.as_ref().map(|info| {
        info.iter()
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect::<IndexMap<_, _>>()
    });

    match (&security_info, &pkg_info) {
        (Some(_), _) if !(build.is_shared() || build.is_stub()) => {
            return Err(ResolveError::invalid(
                &name,
                format!(
                    "has security_info but is neither shared nor a stub (build={})",
                    build
                ),
            ));
        }
        (Some(_), None) => {
            return Err(ResolveError::invalid(&name, "has security_info but not pkg_info"));
        }
        (None, Some(_)) => {
            return Err(ResolveError::invalid(&name, "has pkg_info but not security_info"));
        }
        _ => {}
    }

    Ok(ResolvedLibrary {
        name,
        build,
        major,
        minor,
        depends_on: decl.depends_on.iter().map(|d| d.trim().to_string()).collect(),
        security_info,
        pkg_info,
        island,
        is_private: decl.is_private,
    })
}
