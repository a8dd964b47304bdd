//! Library declarations as written in `libs_cfg/*.json`.
//!
//! Field names are the on-disk contract and must stay backward compatible.
//! Each file holds a JSON array of [`LibraryDeclaration`] records.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::conditional::ConditionalValue;

/// One library record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryDeclaration {
    /// Library name (unique key)
    pub lib_name: String,

    /// Build kind, possibly conditioned on flags (default: static, no strip)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<ConditionalValue<String>>,

    /// Major version, mandatory for shared builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib_major_ver: Option<u32>,

    /// Minor version, mandatory for shared builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib_minor_ver: Option<u32>,

    /// Libraries this one links against
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Package identifier, required together with `security_info`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkg_info: Option<String>,

    /// Security descriptor for shared or stub builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_info: Option<IndexMap<String, String>>,

    /// Island placement, possibly conditioned on flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub island: Option<ConditionalValue<IslandValue>>,

    /// Library belongs to the private build variant
    #[serde(default)]
    pub is_private: bool,

    /// Module catalog descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amdb_info: Option<AmdbDescriptor>,

    /// Module is only used by tests
    #[serde(default)]
    pub is_test_module: bool,
}

impl LibraryDeclaration {
    /// Create a declaration with only a name.
    pub fn new(lib_name: impl Into<String>) -> Self {
        LibraryDeclaration {
            lib_name: lib_name.into(),
            ..Default::default()
        }
    }

    /// Set a literal build kind.
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(ConditionalValue::Literal(build.into()));
        self
    }

    /// Set a flag-conditioned build kind.
    pub fn with_conditional_build<'a>(
        mut self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.build = Some(ConditionalValue::Flags(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        self
    }

    /// Set major and minor versions.
    pub fn with_version(mut self, major: u32, minor: u32) -> Self {
        self.lib_major_ver = Some(major);
        self.lib_minor_ver = Some(minor);
        self
    }

    /// Set the dependency list.
    pub fn with_depends_on(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set a literal island value.
    pub fn with_island(mut self, island: IslandValue) -> Self {
        self.island = Some(ConditionalValue::Literal(island));
        self
    }

    /// Attach a module descriptor.
    pub fn with_amdb(mut self, amdb: AmdbDescriptor) -> Self {
        self.amdb_info = Some(amdb);
        self
    }

    /// Module descriptor, treating an empty object as absent.
    pub fn amdb(&self) -> Option<&AmdbDescriptor> {
        self.amdb_info.as_ref().filter(|a| !a.is_empty())
    }
}

/// Declared island value: a boolean or a historical string spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IslandValue {
    Bool(bool),
    Text(String),
}

impl IslandValue {
    /// Whether the value explicitly opts out of island placement.
    pub fn is_explicitly_false(&self) -> bool {
        match self {
            IslandValue::Bool(b) => !b,
            IslandValue::Text(s) => s.trim() == "False",
        }
    }

    /// Copy with surrounding whitespace removed from text values.
    pub fn normalized(&self) -> IslandValue {
        match self {
            IslandValue::Bool(b) => IslandValue::Bool(*b),
            IslandValue::Text(s) => IslandValue::Text(s.trim().to_string()),
        }
    }
}

impl Default for IslandValue {
    fn default() -> Self {
        IslandValue::Bool(false)
    }
}

impl fmt::Display for IslandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IslandValue::Bool(b) => write!(f, "{}", b),
            IslandValue::Text(s) => f.write_str(s),
        }
    }
}

/// Module catalog descriptor (`amdb_info`).
///
/// Every field is optional on the wire so that missing mandatory keys are
/// reported with the library name instead of a bare parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmdbDescriptor {
    /// Module type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtype: Option<String>,

    /// Numeric module id (`0x`-prefixed or decimal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,

    /// Interface type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itype: Option<String>,

    /// Human-readable module name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,

    /// Revision number (default 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_num: Option<u32>,

    /// Entry point prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// First format id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmt_id1: Option<String>,

    /// Second format id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmt_id2: Option<String>,

    /// Module type reported to the catalog tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qact_module_type: Option<String>,
}

impl AmdbDescriptor {
    /// Create a descriptor with the mandatory fields.
    pub fn new(
        mtype: impl Into<String>,
        mid: impl Into<String>,
        itype: impl Into<String>,
        module_name: impl Into<String>,
    ) -> Self {
        AmdbDescriptor {
            mtype: Some(mtype.into()),
            mid: Some(mid.into()),
            itype: Some(itype.into()),
            module_name: Some(module_name.into()),
            ..Default::default()
        }
    }

    /// Set the revision number.
    pub fn with_rev(mut self, rev: u32) -> Self {
        self.rev_num = Some(rev);
        self
    }

    /// Set the entry point tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the format ids.
    pub fn with_fmt_ids(mut self, fmt_id1: Option<&str>, fmt_id2: Option<&str>) -> Self {
        self.fmt_id1 = fmt_id1.map(str::to_string);
        self.fmt_id2 = fmt_id2.map(str::to_string);
        self
    }

    /// Whether no field is set (`"amdb_info": {}`).
    pub fn is_empty(&self) -> bool {
        *self == AmdbDescriptor::default()
    }

    /// Copy with trimmed text, blank fields dropped and the default revision
    /// filled in, for comparing re-declarations.
    pub fn normalized(&self) -> AmdbDescriptor {
        let text = |field: &Option<String>| {
            field
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        AmdbDescriptor {
            mtype: text(&self.mtype),
            mid: text(&self.mid),
            itype: text(&self.itype),
            module_name: text(&self.module_name),
            rev_num: Some(self.rev_num.unwrap_or(1)),
            tag: text(&self.tag),
            fmt_id1: text(&self.fmt_id1),
            fmt_id2: text(&self.fmt_id2),
            qact_module_type: text(&self.qact_module_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let json = r#"[{
            "lib_name": "mp3_dec",
            "build": { "USES_MP3_SHARED": "SHARED_BUILD_STRIP", "DEFAULT": "STATIC_BUILD_NO_STRIP" },
            "lib_major_ver": 1,
            "lib_minor_ver": 2,
            "depends_on": ["audio_utils"],
            "island": "True",
            "is_private": true,
            "amdb_info": {
                "mtype": "decoder",
                "mid": "0x10",
                "itype": "capi",
                "module_name": "MODULE_ID_MP3_DECODER",
                "tag": "capi_mp3_dec",
                "fmt_id1": "MEDIA_FMT_ID_MP3"
            }
        }]"#;

        let decls: Vec<LibraryDeclaration> = serde_json::from_str(json).unwrap();
        assert_eq!(decls.len(), 1);

        let decl = &decls[0];
        assert_eq!(decl.lib_name, "mp3_dec");
        assert!(decl.build.as_ref().unwrap().is_conditional());
        assert_eq!(decl.lib_major_ver, Some(1));
        assert_eq!(decl.depends_on, vec!["audio_utils"]);
        assert!(decl.is_private);
        assert_eq!(
            decl.island,
            Some(ConditionalValue::Literal(IslandValue::Text("True".to_string())))
        );

        let amdb = decl.amdb().unwrap();
        assert_eq!(amdb.mid.as_deref(), Some("0x10"));
        assert_eq!(amdb.rev_num, None);
    }

    #[test]
    fn test_minimal_record_defaults() {
        let decls: Vec<LibraryDeclaration> =
            serde_json::from_str(r#"[{"lib_name": "utils", "amdb_info": {}}]"#).unwrap();
        let decl = &decls[0];

        assert!(decl.build.is_none());
        assert!(decl.depends_on.is_empty());
        assert!(!decl.is_private);
        assert!(!decl.is_test_module);
        assert!(decl.amdb_info.is_some());
        assert!(decl.amdb().is_none());
    }

    #[test]
    fn test_normalized_descriptor() {
        let a = AmdbDescriptor::new("generic", " 0x20 ", "capi", "MODULE_ID_GAIN").with_tag("capi_gain");
        let mut b = AmdbDescriptor::new("generic", "0x20", "capi", "MODULE_ID_GAIN")
            .with_tag("capi_gain")
            .with_rev(1);
        b.qact_module_type = Some(String::new());
        assert_eq!(a.normalized(), b.normalized());

        let c = b.clone().with_rev(2);
        assert_ne!(a.normalized(), c.normalized());
    }

    #[test]
    fn test_island_explicit_false() {
        assert!(IslandValue::Bool(false).is_explicitly_false());
        assert!(IslandValue::Text(" False ".to_string()).is_explicitly_false());
        assert!(!IslandValue::Text("false".to_string()).is_explicitly_false());
        assert!(!IslandValue::Bool(true).is_explicitly_false());
    }

    #[test]
    fn test_conditional_island() {
        let decl: LibraryDeclaration = serde_json::from_str(
            r#"{"lib_name": "x", "island": {"USES_X_ISLAND": "True", "DEFAULT": "False"}}"#,
        )
        .unwrap();
        assert!(decl.island.unwrap().is_conditional());
    }
}
