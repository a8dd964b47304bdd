//! Module identities and revisions.
//!
//! A module is identified by its numeric id alone; the declared module type
//! is carried along for display and the generated tables, but two
//! declarations with the same id and different types are the same module.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::core::build_kind::BuildKind;
use crate::resolver::ResolveError;

/// Category of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Framework,
    Generic,
    Decoder,
    Encoder,
    Converter,
    Packetizer,
    Depacketizer,
    Detector,
    Generator,
    Pp,
    EndPoint,
}

impl ModuleType {
    /// All module types in table order.
    pub const ALL: [ModuleType; 11] = [
        ModuleType::Generic,
        ModuleType::Decoder,
        ModuleType::Encoder,
        ModuleType::Converter,
        ModuleType::Packetizer,
        ModuleType::Depacketizer,
        ModuleType::Detector,
        ModuleType::Generator,
        ModuleType::Pp,
        ModuleType::EndPoint,
        ModuleType::Framework,
    ];

    /// Declaration spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Framework => "framework",
            ModuleType::Generic => "generic",
            ModuleType::Decoder => "decoder",
            ModuleType::Encoder => "encoder",
            ModuleType::Converter => "converter",
            ModuleType::Packetizer => "packetizer",
            ModuleType::Depacketizer => "depacketizer",
            ModuleType::Detector => "detector",
            ModuleType::Generator => "generator",
            ModuleType::Pp => "pp",
            ModuleType::EndPoint => "end_point",
        }
    }

    /// Numeric code used by the loader tables.
    pub fn code(&self) -> u32 {
        match self {
            ModuleType::Framework => 1,
            ModuleType::Generic => 2,
            ModuleType::Decoder => 3,
            ModuleType::Encoder => 4,
            ModuleType::Converter => 5,
            ModuleType::Packetizer => 6,
            ModuleType::Depacketizer => 7,
            ModuleType::Detector => 8,
            ModuleType::Generator => 9,
            ModuleType::Pp => 10,
            ModuleType::EndPoint => 11,
        }
    }

    /// Whether `fmt_id1` is mandatory for this type.
    pub fn requires_fmt_id1(&self) -> bool {
        matches!(
            self,
            ModuleType::Decoder | ModuleType::Encoder | ModuleType::Converter | ModuleType::Depacketizer
        )
    }

    /// Whether `fmt_id2` is mandatory for this type.
    pub fn requires_fmt_id2(&self) -> bool {
        matches!(self, ModuleType::Converter)
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ModuleType {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        ModuleType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ResolveError::UnknownEnumValue {
                what: "module type",
                value: s,
                expected: ModuleType::ALL.iter().map(|t| t.as_str()).collect(),
            })
    }
}

/// How the loader talks to a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceType {
    /// Registered but never instantiated.
    VirtualStub,
    Capi,
}

impl InterfaceType {
    pub const ALL: [InterfaceType; 2] = [InterfaceType::VirtualStub, InterfaceType::Capi];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceType::VirtualStub => "virtual_stub",
            InterfaceType::Capi => "capi",
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            InterfaceType::VirtualStub => 1,
            InterfaceType::Capi => 2,
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InterfaceType {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        InterfaceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ResolveError::UnknownEnumValue {
                what: "interface type",
                value: s,
                expected: InterfaceType::ALL.iter().map(|t| t.as_str()).collect(),
            })
    }
}

/// Module identity. Equality and hashing use the numeric id only.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModuleId {
    pub module_type: ModuleType,
    #[serde(serialize_with = "serialize_hex")]
    pub mid: u32,
}

impl ModuleId {
    pub fn new(module_type: ModuleType, mid: u32) -> Self {
        ModuleId { module_type, mid }
    }

    /// Parse a declared `(mtype, mid)` pair.
    pub fn parse(mtype: &str, mid: &str) -> Result<Self, ResolveError> {
        Ok(ModuleId {
            module_type: mtype.parse()?,
            mid: parse_mid(mid)?,
        })
    }
}

impl PartialEq for ModuleId {
    fn eq(&self, other: &Self) -> bool {
        self.mid == other.mid
    }
}

impl Eq for ModuleId {}

impl Hash for ModuleId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mid.hash(state)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module (mtype={}, mid={:#x})", self.module_type, self.mid)
    }
}

fn serialize_hex<S: Serializer>(mid: &u32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:#x}", mid))
}

/// Parse a module id with an optional `0x`, `0o` or `0b` radix prefix.
pub fn parse_mid(text: &str) -> Result<u32, ResolveError> {
    let text = text.trim().to_lowercase();
    let (digits, radix) = if let Some(rest) = text.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = text.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = text.strip_prefix("0b") {
        (rest, 2)
    } else {
        (text.as_str(), 10)
    };

    u32::from_str_radix(&digits.replace('_', ""), radix).map_err(|_| ResolveError::UnknownEnumValue {
        what: "module id",
        value: text.clone(),
        expected: vec!["a decimal or 0x-prefixed 32-bit integer"],
    })
}

/// How a revision ends up in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuiltType {
    #[serde(rename = "STATIC")]
    Static,
    #[serde(rename = "DYNAMIC")]
    Dynamic,
    #[serde(rename = "VIRTUAL-STUB")]
    VirtualStub,
}

impl BuiltType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltType::Static => "STATIC",
            BuiltType::Dynamic => "DYNAMIC",
            BuiltType::VirtualStub => "VIRTUAL-STUB",
        }
    }
}

impl fmt::Display for BuiltType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One revision of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRevision {
    pub revision: u32,
    /// Module type of the declaration this revision came from
    pub module_type: ModuleType,
    pub module_name: String,
    pub interface_type: InterfaceType,
    /// Build kind inherited from the owning library
    pub build: BuildKind,
    pub library: String,
    /// Shipping file, shared-family kinds only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fmt_id1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fmt_id2: Option<String>,
    /// Module type reported to the catalog tool, if overridden
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qact_module_type: Option<ModuleType>,
    pub is_test_module: bool,
    pub is_private: bool,
}

impl ModuleRevision {
    /// How this revision is built.
    ///
    /// `SHARED_NO_BUILD` is dynamic: static modules never carry a revision
    /// history, so a not-built module can only be a dynamic one.
    pub fn built_type(&self) -> BuiltType {
        if self.build == BuildKind::StaticVirtualStub || self.interface_type == InterfaceType::VirtualStub {
            BuiltType::VirtualStub
        } else if self.build.is_static() {
            BuiltType::Static
        } else {
            BuiltType::Dynamic
        }
    }

    /// Module type shown in the catalog.
    pub fn catalog_type(&self) -> ModuleType {
        self.qact_module_type.unwrap_or(self.module_type)
    }

    /// Whether the module is listed in the catalog.
    pub fn appears_in_catalog(&self) -> bool {
        self.built_type() != BuiltType::VirtualStub
            && !self.is_test_module
            && self.catalog_type() != ModuleType::Framework
    }

    /// Whether a revision bump relative to `other` is justified.
    pub fn differs_in_file(&self, other: &ModuleRevision) -> bool {
        self.filename != other.filename
    }

    /// First format id, or the catalog placeholder.
    pub fn fmt_id1_str(&self) -> &str {
        self.fmt_id1.as_deref().unwrap_or(NOT_APPLICABLE)
    }

    /// Second format id, or the catalog placeholder.
    pub fn fmt_id2_str(&self) -> &str {
        self.fmt_id2.as_deref().unwrap_or(NOT_APPLICABLE)
    }
}

/// Placeholder for absent format ids.
pub const NOT_APPLICABLE: &str = "NOT_APPLICABLE";
