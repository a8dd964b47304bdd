//! Resolved libraries - what a declaration means for this environment.

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::build_kind::BuildKind;
use crate::core::declaration::IslandValue;

/// A library after conditional values and build policy were applied.
///
/// Two declarations with the same name must resolve to equal values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLibrary {
    pub name: String,
    pub build: BuildKind,
    pub major: u32,
    pub minor: u32,
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_info: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkg_info: Option<String>,
    pub island: IslandValue,
    pub is_private: bool,
}

impl ResolvedLibrary {
    /// File the library is shipped in, for shared-family kinds.
    ///
    /// `SHARED_NO_BUILD` libraries still have a file name since their modules
    /// are registered for loading.
    pub fn so_file_name(&self) -> Option<String> {
        if self.build.is_static() {
            return None;
        }
        Some(format!("{}.so.{}", self.name, self.major))
    }

    /// Names of the fields that differ from `other`.
    pub fn differences(&self, other: &ResolvedLibrary) -> Vec<&'static str> {
        let mut diffs = Vec::new();
        if self.name != other.name {
            diffs.push("lib_name");
        }
        if self.build != other.build {
            diffs.push("build");
        }
        if self.major != other.major {
            diffs.push("lib_major_ver");
        }
        if self.minor != other.minor {
            diffs.push("lib_minor_ver");
        }
        if self.depends_on != other.depends_on {
            diffs.push("depends_on");
        }
        if self.security_info != other.security_info {
            diffs.push("security_info");
        }
        if self.pkg_info != other.pkg_info {
            diffs.push("pkg_info");
        }
        if self.island != other.island {
            diffs.push("island");
        }
        if self.is_private != other.is_private {
            diffs.push("is_private");
        }
        diffs
    }

    /// Upper-cased name used in linkage flags.
    pub fn flag_name(&self) -> String {
        self.name.to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib(build: BuildKind) -> ResolvedLibrary {
        ResolvedLibrary {
            name: "mp3_dec".to_string(),
            build,
            major: 2,
            minor: 1,
            depends_on: vec![],
            security_info: None,
            pkg_info: None,
            island: IslandValue::default(),
            is_private: false,
        }
    }

    #[test]
    fn test_so_file_name() {
        assert_eq!(lib(BuildKind::SharedStrip).so_file_name().as_deref(), Some("mp3_dec.so.2"));
        assert_eq!(lib(BuildKind::SharedNoBuild).so_file_name().as_deref(), Some("mp3_dec.so.2"));
        assert_eq!(lib(BuildKind::StaticStrip).so_file_name(), None);
    }

    #[test]
    fn test_differences() {
        let a = lib(BuildKind::SharedStrip);
        let mut b = a.clone();
        assert!(a.differences(&b).is_empty());

        b.minor = 3;
        b.is_private = true;
        assert_eq!(a.differences(&b), vec!["lib_minor_ver", "is_private"]);
    }
}
