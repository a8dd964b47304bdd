//! Module identity and revision registry.
//!
//! Every library with an `amdb_info` descriptor contributes one revision of
//! a module. Revisions of the same module id are collected under a single
//! identity and checked against the revision rules:
//!
//! - revision numbers are unique per identity
//! - a new revision must ship in a different file than its neighbours
//! - a module that is not purely dynamic has exactly one revision
//! - revision numbers are contiguous (checked once every library is in)

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::core::build_kind::BuildKind;
use crate::core::declaration::AmdbDescriptor;
use crate::core::library::ResolvedLibrary;
use crate::core::module::{BuiltType, InterfaceType, ModuleId, ModuleRevision, ModuleType};
use crate::resolver::ResolveError;
use crate::util::Diagnostic;

/// Revision used when `rev_num` is not declared.
pub const DEFAULT_REVISION: u32 = 1;

/// All revisions registered for one module id.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    /// Identity as first declared
    pub id: ModuleId,
    revisions: BTreeMap<u32, ModuleRevision>,
}

impl ModuleEntry {
    fn new(id: ModuleId, revision: ModuleRevision) -> Self {
        let mut revisions = BTreeMap::new();
        revisions.insert(revision.revision, revision);
        ModuleEntry { id, revisions }
    }

    /// Revisions, newest first.
    pub fn revisions(&self) -> impl Iterator<Item = &ModuleRevision> {
        self.revisions.values().rev()
    }

    /// Newest revision.
    pub fn latest(&self) -> Option<&ModuleRevision> {
        self.revisions.values().next_back()
    }

    /// Look up one revision.
    pub fn revision(&self, revision: u32) -> Option<&ModuleRevision> {
        self.revisions.get(&revision)
    }

    /// Number of revisions.
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

impl Serialize for ModuleEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let revisions: Vec<&ModuleRevision> = self.revisions().collect();
        let mut state = serializer.serialize_struct("ModuleEntry", 2)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("revisions", &revisions)?;
        state.end()
    }
}

/// Registered modules in declaration order, keyed by numeric id.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: IndexMap<u32, ModuleEntry>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        ModuleRegistry::default()
    }

    /// Add one revision of a module.
    pub fn register(
        &mut self,
        id: ModuleId,
        revision: ModuleRevision,
        notices: &mut Vec<Diagnostic>,
    ) -> Result<(), ResolveError> {
        validate_revision(&revision)?;

        let Some(entry) = self.modules.get_mut(&id.mid) else {
            tracing::debug!("{} rev {}: new module", id, revision.revision);
            self.modules.insert(id.mid, ModuleEntry::new(id, revision));
            return Ok(());
        };

        if entry.revisions.contains_key(&revision.revision) {
            return Err(ResolveError::DuplicateRevision {
                module: entry.id.to_string(),
                revision: revision.revision,
            });
        }

        let not_dynamic = revision.built_type() != BuiltType::Dynamic
            || entry
                .revisions
                .values()
                .any(|r| r.built_type() != BuiltType::Dynamic);
        if not_dynamic {
            return Err(ResolveError::TooManyStaticRevisions {
                module: entry.id.to_string(),
                count: entry.revisions.len() + 1,
            });
        }

        // a bump is justified when any existing neighbour ships a different file
        let neighbours: Vec<(u32, &ModuleRevision)> =
            [revision.revision.checked_sub(1), revision.revision.checked_add(1)]
                .into_iter()
                .flatten()
                .filter_map(|n| entry.revisions.get(&n).map(|existing| (n, existing)))
                .collect();
        if let Some(&(adjacent, _)) = neighbours.first() {
            if neighbours.iter().all(|(_, existing)| !revision.differs_in_file(existing)) {
                return Err(ResolveError::SpuriousRevisionBump {
                    module: entry.id.to_string(),
                    revision: revision.revision,
                    adjacent,
                    filename: revision.filename.clone().unwrap_or_default(),
                });
            }
        }

        if entry.id.module_type != id.module_type {
            notices.push(
                Diagnostic::warning(format!(
                    "{} is also declared as {} by library `{}`",
                    entry.id, id.module_type, revision.library
                ))
                .with_context(format!("keeping module type {}", entry.id.module_type)),
            );
        }

        tracing::debug!("{} rev {}: added", entry.id, revision.revision);
        entry.revisions.insert(revision.revision, revision);
        Ok(())
    }

    /// Every identity in registration order.
    pub fn all_identities(&self) -> impl Iterator<Item = &ModuleId> {
        self.modules.values().map(|e| &e.id)
    }

    /// Revisions of a module, newest first. Empty for unknown modules.
    pub fn revisions_of(&self, id: &ModuleId) -> Vec<&ModuleRevision> {
        self.modules
            .get(&id.mid)
            .map(|e| e.revisions().collect())
            .unwrap_or_default()
    }

    /// Newest revision of a module.
    pub fn latest_revision(&self, id: &ModuleId) -> Option<&ModuleRevision> {
        self.modules.get(&id.mid).and_then(ModuleEntry::latest)
    }

    /// Look up a module by numeric id.
    pub fn get(&self, mid: u32) -> Option<&ModuleEntry> {
        self.modules.get(&mid)
    }

    /// Iterate over modules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.modules.values()
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Check that no module skips a revision number.
    pub fn check_contiguity(&self) -> Result<(), ResolveError> {
        for entry in self.modules.values() {
            let numbers: Vec<u32> = entry.revisions.keys().rev().copied().collect();
            for pair in numbers.windows(2) {
                let (newer, older) = (pair[0], pair[1]);
                if newer - older != 1 {
                    return Err(ResolveError::RevisionGap {
                        module: entry.id.to_string(),
                        newer,
                        older,
                    });
                }
            }
        }
        Ok(())
    }

    /// Check that every module has at least one revision that gets built.
    pub fn check_at_least_one_built(&self) -> Result<(), ResolveError> {
        for entry in self.modules.values() {
            if entry
                .revisions
                .values()
                .all(|r| r.build == BuildKind::SharedNoBuild)
            {
                return Err(ResolveError::NoBuiltRevision {
                    module: entry.id.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Serialize for ModuleRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.modules.values())
    }
}

/// Build the identity and revision described by a library's descriptor.
pub fn module_from_declaration(
    lib: &ResolvedLibrary,
    amdb: &AmdbDescriptor,
    is_test_module: bool,
    notices: &mut Vec<Diagnostic>,
) -> Result<(ModuleId, ModuleRevision), ResolveError> {
    let required = |field: &Option<String>, key: &str| -> Result<String, ResolveError> {
        match field.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(ResolveError::schema(
                &lib.name,
                format!("amdb_info.{} is mandatory", key),
            )),
        }
    };

    let mtype = required(&amdb.mtype, "mtype")?;
    let mid = required(&amdb.mid, "mid")?;
    let itype = required(&amdb.itype, "itype")?;
    let module_name = required(&amdb.module_name, "module_name")?;
    let id = ModuleId::parse(&mtype, &mid)?;

    let revision = amdb.rev_num.unwrap_or(DEFAULT_REVISION);
    if revision == 0 {
        return Err(ResolveError::schema(&lib.name, "amdb_info.rev_num must be positive"));
    }

    let interface_type = if lib.build == BuildKind::StaticVirtualStub {
        if !itype.eq_ignore_ascii_case(InterfaceType::VirtualStub.as_str()) {
            notices.push(Diagnostic::note(format!(
                "{}: itype {} is forced to virtual_stub for library `{}` ({})",
                id, itype, lib.name, lib.build
            )));
        }
        InterfaceType::VirtualStub
    } else {
        itype.parse()?
    };

    let qact_module_type = match amdb.qact_module_type.as_deref().map(str::trim) {
        Some(qact) if !qact.is_empty() => Some(qact.parse::<ModuleType>()?),
        _ => None,
    };

    let optional = |field: &Option<String>| {
        field
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let revision = ModuleRevision {
        revision,
        module_type: id.module_type,
        module_name,
        interface_type,
        build: lib.build,
        library: lib.name.clone(),
        filename: lib.so_file_name(),
        tag: amdb.tag.as_deref().map(str::trim).unwrap_or_default().to_string(),
        fmt_id1: optional(&amdb.fmt_id1),
        fmt_id2: optional(&amdb.fmt_id2),
        qact_module_type,
        is_test_module,
        is_private: lib.is_private,
    };

    Ok((id, revision))
}

/// Descriptor completeness rules that depend on the module type and build.
fn validate_revision(revision: &ModuleRevision) -> Result<(), ResolveError> {
    let library = &revision.library;

    if revision.module_name.trim().is_empty() {
        return Err(ResolveError::schema(library, "amdb_info.module_name cannot be empty"));
    }
    if revision.module_type.requires_fmt_id1() && revision.fmt_id1.is_none() {
        return Err(ResolveError::schema(
            library,
            format!("fmt_id1 is mandatory for {} modules", revision.module_type),
        ));
    }
    if revision.module_type.requires_fmt_id2() && revision.fmt_id2.is_none() {
        return Err(ResolveError::schema(
            library,
            format!("fmt_id2 is mandatory for {} modules", revision.module_type),
        ));
    }
    if revision.tag.is_empty() && revision.build != BuildKind::StaticVirtualStub {
        return Err(ResolveError::schema(
            library,
            format!("amdb_info.tag is mandatory for {}", revision.build),
        ));
    }
    if revision.qact_module_type == Some(ModuleType::Framework) {
        return Err(ResolveError::invalid(
            library,
            "qact_module_type cannot be framework",
        ));
    }
    Ok(())
}
