//! Catalog and loader-table views of a module registry.
//!
//! These are the data the code generators render: the module catalog read
//! by the tuning tool, and the tables the loader walks at startup. They are
//! plain serializable records; rendering them as C or XML is left to the
//! generators.

use indexmap::IndexSet;
use serde::{Serialize, Serializer};

use crate::core::env::Environment;
use crate::core::module::{BuiltType, InterfaceType, ModuleId, ModuleRevision, ModuleType};
use crate::registry::ModuleRegistry;

fn serialize_hex<S: Serializer>(mid: &u32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:#x}", mid))
}

/// One module as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub module_type: ModuleType,
    #[serde(serialize_with = "serialize_hex")]
    pub mid: u32,
    pub name: String,
    pub fmt_id1: String,
    pub fmt_id2: String,
    pub build_type: BuiltType,
}

/// Catalog entries for every module whose newest revision is listed.
pub fn catalog_entries(modules: &ModuleRegistry) -> Vec<CatalogEntry> {
    modules
        .all_identities()
        .filter_map(|id| modules.latest_revision(id).map(|rev| (id, rev)))
        .filter(|(_, rev)| rev.appears_in_catalog())
        .map(|(id, rev)| CatalogEntry {
            module_type: rev.catalog_type(),
            mid: id.mid,
            name: rev.module_name.clone(),
            fmt_id1: rev.fmt_id1_str().to_string(),
            fmt_id2: rev.fmt_id2_str().to_string(),
            build_type: rev.built_type(),
        })
        .collect()
}

/// Loader row for a revision shipped in a shared object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicRow {
    pub module_type: ModuleType,
    #[serde(serialize_with = "serialize_hex")]
    pub mid: u32,
    pub revision: u32,
    pub filename: String,
    pub tag: String,
}

/// Loader row for a module linked into the image.
///
/// Framework modules have no entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticRow {
    pub module_type: ModuleType,
    #[serde(serialize_with = "serialize_hex")]
    pub mid: u32,
    pub get_static_properties: Option<String>,
    pub init: Option<String>,
}

impl StaticRow {
    fn new(id: &ModuleId, rev: &ModuleRevision) -> Self {
        let (get_static_properties, init) = if id.module_type == ModuleType::Framework {
            (None, None)
        } else {
            (
                Some(format!("{}_get_static_properties", rev.tag)),
                Some(format!("{}_init", rev.tag)),
            )
        };
        StaticRow {
            module_type: id.module_type,
            mid: id.mid,
            get_static_properties,
            init,
        }
    }
}

/// Loader row for a registered-only module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualStubRow {
    pub module_type: ModuleType,
    #[serde(serialize_with = "serialize_hex")]
    pub mid: u32,
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub dynamic_capi: usize,
    pub static_capi: usize,
    pub virtual_stub: usize,
    pub private_dynamic_capi: usize,
    pub private_static_capi: usize,
}

/// Every table the loader is generated from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoaderTable {
    pub dynamic_capi: Vec<DynamicRow>,
    pub static_capi: Vec<StaticRow>,
    pub virtual_stub: Vec<VirtualStubRow>,
    /// Only filled when the private build variant is enabled
    pub private_dynamic_capi: Vec<DynamicRow>,
    pub private_static_capi: Vec<StaticRow>,
    /// Shared objects referenced by dynamic rows, first-seen order
    pub filenames: IndexSet<String>,
    /// Entry point tags referenced by dynamic rows, first-seen order
    pub tags: IndexSet<String>,
    /// Emit empty framework tables for a standalone framework compilation
    pub framework_placeholders: bool,
}

impl LoaderTable {
    /// Partition every revision of every module into loader tables.
    ///
    /// Dynamic revisions are listed newest first. A statically linked
    /// module only ever has one revision.
    pub fn build(modules: &ModuleRegistry, env: &Environment) -> Self {
        let modes = env.modes();
        let mut table = LoaderTable {
            framework_placeholders: modes.standalone_framework,
            ..Default::default()
        };

        for entry in modules.iter() {
            let id = &entry.id;
            for rev in entry.revisions() {
                let private = rev.is_private && modes.private_variant;

                match (rev.built_type(), rev.interface_type) {
                    (BuiltType::Dynamic, InterfaceType::Capi) => {
                        table.filenames.insert(rev.filename.clone().unwrap_or_default());
                        table.tags.insert(rev.tag.clone());
                        let row = DynamicRow {
                            module_type: id.module_type,
                            mid: id.mid,
                            revision: rev.revision,
                            filename: rev.filename.clone().unwrap_or_default(),
                            tag: rev.tag.clone(),
                        };
                        if private {
                            table.private_dynamic_capi.push(row);
                        } else {
                            table.dynamic_capi.push(row);
                        }
                    }
                    (BuiltType::Static, InterfaceType::Capi) => {
                        let row = StaticRow::new(id, rev);
                        if private {
                            table.private_static_capi.push(row);
                        } else {
                            table.static_capi.push(row);
                        }
                    }
                    _ => table.virtual_stub.push(VirtualStubRow {
                        module_type: id.module_type,
                        mid: id.mid,
                    }),
                }
            }
        }

        table
    }

    /// Row counts per table.
    pub fn counts(&self) -> TableCounts {
        TableCounts {
            dynamic_capi: self.dynamic_capi.len(),
            static_capi: self.static_capi.len(),
            virtual_stub: self.virtual_stub.len(),
            private_dynamic_capi: self.private_dynamic_capi.len(),
            private_static_capi: self.private_static_capi.len(),
        }
    }
}

/// C identifier for a string constant (`mp3_dec.so.1` -> `MP3_DEC_SO_1`).
pub fn c_identifier(value: &str) -> String {
    value.to_uppercase().replace(['.', '-'], "_")
}
