//! Build kinds - how a library is produced.
//!
//! Build kinds fall into a static family (linked into the image) and a
//! shared family (built as loadable `.so` files, or not built at all).
//! All classification is done through exhaustive tables on the enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::resolver::ResolveError;

/// The way a library is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildKind {
    #[serde(rename = "STATIC_BUILD_STRIP")]
    StaticStrip,
    #[serde(rename = "STATIC_BUILD_NO_STRIP")]
    StaticNoStrip,
    #[serde(rename = "STATIC_BUILD_STRIP_ONLY")]
    StaticStripOnly,
    #[serde(rename = "STATIC_BUILD_STUB")]
    StaticStub,
    #[serde(rename = "STATIC_BUILD_VIRTUAL_STUB")]
    StaticVirtualStub,
    #[serde(rename = "SHARED_BUILD_STRIP")]
    SharedStrip,
    #[serde(rename = "SHARED_BUILD_NO_STRIP")]
    SharedNoStrip,
    /// Not built, but may still be registered as a dynamic module.
    #[serde(rename = "SHARED_NO_BUILD")]
    SharedNoBuild,
}

impl BuildKind {
    /// All build kinds, static family first.
    pub const ALL: [BuildKind; 8] = [
        BuildKind::StaticStrip,
        BuildKind::StaticNoStrip,
        BuildKind::StaticStripOnly,
        BuildKind::StaticStub,
        BuildKind::StaticVirtualStub,
        BuildKind::SharedStrip,
        BuildKind::SharedNoStrip,
        BuildKind::SharedNoBuild,
    ];

    /// Canonical declaration spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildKind::StaticStrip => "STATIC_BUILD_STRIP",
            BuildKind::StaticNoStrip => "STATIC_BUILD_NO_STRIP",
            BuildKind::StaticStripOnly => "STATIC_BUILD_STRIP_ONLY",
            BuildKind::StaticStub => "STATIC_BUILD_STUB",
            BuildKind::StaticVirtualStub => "STATIC_BUILD_VIRTUAL_STUB",
            BuildKind::SharedStrip => "SHARED_BUILD_STRIP",
            BuildKind::SharedNoStrip => "SHARED_BUILD_NO_STRIP",
            BuildKind::SharedNoBuild => "SHARED_NO_BUILD",
        }
    }

    /// Short alias accepted in declarations.
    fn short_name(&self) -> &'static str {
        match self {
            BuildKind::StaticStrip => "STATIC_STRIP",
            BuildKind::StaticNoStrip => "STATIC_NO_STRIP",
            BuildKind::StaticStripOnly => "STATIC_STRIP_ONLY",
            BuildKind::StaticStub => "STATIC_STUB",
            BuildKind::StaticVirtualStub => "STATIC_VIRTUAL_STUB",
            BuildKind::SharedStrip => "SHARED_STRIP",
            BuildKind::SharedNoStrip => "SHARED_NO_STRIP",
            BuildKind::SharedNoBuild => "SHARED_NO_BUILD",
        }
    }

    /// Check if this kind links the library into the image.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            BuildKind::StaticStrip
                | BuildKind::StaticNoStrip
                | BuildKind::StaticStripOnly
                | BuildKind::StaticStub
                | BuildKind::StaticVirtualStub
        )
    }

    /// Check if this kind belongs to the shared family.
    pub fn is_shared(&self) -> bool {
        !self.is_static()
    }

    /// Check if this kind is a stub.
    pub fn is_stub(&self) -> bool {
        matches!(self, BuildKind::StaticStub | BuildKind::StaticVirtualStub)
    }

    /// Suffix of the linkage flag for static kinds.
    ///
    /// `None` for `STATIC_BUILD_NO_STRIP` and for every shared kind.
    pub fn env_suffix(&self) -> Option<&'static str> {
        match self {
            BuildKind::StaticStrip => Some("_STRIP"),
            BuildKind::StaticStripOnly => Some("_STRIP_ONLY"),
            BuildKind::StaticStub | BuildKind::StaticVirtualStub => Some("_STUB"),
            BuildKind::StaticNoStrip
            | BuildKind::SharedStrip
            | BuildKind::SharedNoStrip
            | BuildKind::SharedNoBuild => None,
        }
    }

    /// Static equivalent used when shared artifacts are not produced.
    ///
    /// `SHARED_NO_BUILD` maps to itself.
    pub fn downgrade_to_static(&self) -> BuildKind {
        match self {
            BuildKind::SharedStrip => BuildKind::StaticStrip,
            BuildKind::SharedNoStrip => BuildKind::StaticNoStrip,
            other => *other,
        }
    }
}

impl Default for BuildKind {
    fn default() -> Self {
        BuildKind::StaticNoStrip
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BuildKind {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        BuildKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.short_name() == s)
            .ok_or_else(|| ResolveError::UnknownEnumValue {
                what: "build kind",
                value: s.to_string(),
                expected: BuildKind::ALL.iter().map(|k| k.as_str()).collect(),
            })
    }
}

/// Outcome of [`resolve_library_build_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindResolution {
    /// Resolved build kind.
    pub kind: BuildKind,
    /// The declared shared kind was replaced by `SHARED_NO_BUILD`.
    pub forced_no_build: bool,
}

/// Derive the effective build kind of a library.
///
/// Without shared artifacts, shared libraries that implement no module are
/// not built at all: building them statically would clash with the symbols of
/// the libraries that link them. Everything else is downgraded to its static
/// equivalent.
pub fn resolve_library_build_kind(
    declared: BuildKind,
    has_amdb_descriptor: bool,
    shared_artifacts_enabled: bool,
) -> KindResolution {
    if shared_artifacts_enabled {
        return KindResolution {
            kind: declared,
            forced_no_build: false,
        };
    }

    let forced_no_build = declared.is_shared() && !has_amdb_descriptor;
    let kind = if forced_no_build {
        BuildKind::SharedNoBuild
    } else {
        declared
    };

    KindResolution {
        kind: kind.downgrade_to_static(),
        forced_no_build: forced_no_build && declared != BuildKind::SharedNoBuild,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        let statics: Vec<_> = BuildKind::ALL.iter().filter(|k| k.is_static()).collect();
        let shared: Vec<_> = BuildKind::ALL.iter().filter(|k| k.is_shared()).collect();
        assert_eq!(statics.len(), 5);
        assert_eq!(shared.len(), 3);

        assert!(BuildKind::StaticStub.is_stub());
        assert!(BuildKind::StaticVirtualStub.is_stub());
        assert!(!BuildKind::SharedNoBuild.is_stub());
    }

    #[test]
    fn test_env_suffix() {
        assert_eq!(BuildKind::StaticStrip.env_suffix(), Some("_STRIP"));
        assert_eq!(BuildKind::StaticStripOnly.env_suffix(), Some("_STRIP_ONLY"));
        assert_eq!(BuildKind::StaticStub.env_suffix(), Some("_STUB"));
        assert_eq!(BuildKind::StaticVirtualStub.env_suffix(), Some("_STUB"));
        assert_eq!(BuildKind::StaticNoStrip.env_suffix(), None);
        assert_eq!(BuildKind::SharedStrip.env_suffix(), None);
    }

    #[test]
    fn test_downgrade_lands_in_static_family_or_no_build() {
        for kind in BuildKind::ALL {
            let down = kind.downgrade_to_static();
            assert!(down.is_static() || down == BuildKind::SharedNoBuild);
            if kind.is_static() {
                assert_eq!(down, kind);
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("STATIC_BUILD_STRIP".parse::<BuildKind>().unwrap(), BuildKind::StaticStrip);
        assert_eq!(" SHARED_STRIP ".parse::<BuildKind>().unwrap(), BuildKind::SharedStrip);
        assert!("STATIC_BUILD".parse::<BuildKind>().is_err());
        assert!("static_build_strip".parse::<BuildKind>().is_err());
    }

    #[test]
    fn test_shared_with_module_is_downgraded() {
        let res = resolve_library_build_kind(BuildKind::SharedStrip, true, false);
        assert_eq!(res.kind, BuildKind::StaticStrip);
        assert!(!res.forced_no_build);
    }

    #[test]
    fn test_shared_without_module_is_not_built() {
        let res = resolve_library_build_kind(BuildKind::SharedStrip, false, false);
        assert_eq!(res.kind, BuildKind::SharedNoBuild);
        assert!(res.forced_no_build);
    }

    #[test]
    fn test_shared_artifacts_keep_declared_kind() {
        for kind in BuildKind::ALL {
            let res = resolve_library_build_kind(kind, false, true);
            assert_eq!(res.kind, kind);
        }
    }

    #[test]
    fn test_static_kinds_untouched_without_shared_artifacts() {
        let res = resolve_library_build_kind(BuildKind::StaticStripOnly, false, false);
        assert_eq!(res.kind, BuildKind::StaticStripOnly);
        assert!(!res.forced_no_build);
    }
}
