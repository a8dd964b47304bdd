//! Linkage facts forwarded to the build system.
//!
//! Shared libraries become `USES_<NAME>_SO` records carrying version and
//! dependency information; static libraries become boolean linkage flags.
//! The facts are returned as data so resolution never mutates the
//! environment it reads.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::core::build_kind::BuildKind;
use crate::core::declaration::IslandValue;
use crate::core::env::{Environment, Modes};
use crate::core::library::ResolvedLibrary;
use crate::registry::library::LibraryRegistry;
use crate::util::Diagnostic;

/// A shared library the build system must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedLibFact {
    pub name: String,
    pub major: u32,
    pub minor: u32,
    pub depends_on: Vec<String>,
    /// Only recorded for non-mobile targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_info: Option<IndexMap<String, String>>,
    /// Only recorded for non-mobile targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkg_info: Option<String>,
}

/// Everything the build system needs to know about linkage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkageFacts {
    /// Shared library records keyed by their `USES_*_SO` flag
    pub shared: IndexMap<String, SharedLibFact>,
    /// Linkage flags to enable, in first-seen order
    pub flags: IndexSet<String>,
}

impl LinkageFacts {
    /// Derive the facts for every registered library.
    pub fn collect(
        libraries: &LibraryRegistry,
        env: &Environment,
        notices: &mut Vec<Diagnostic>,
    ) -> Self {
        let modes = env.modes();
        let mut facts = LinkageFacts::default();

        for lib in libraries.iter() {
            if let Some(key) = shared_key(lib) {
                if facts.shared.contains_key(&key) {
                    notices.push(Diagnostic::warning(format!(
                        "shared library `{}` was already added for build as {}",
                        lib.name, key
                    )));
                    continue;
                }
                let fact = shared_fact(lib, &modes);
                tracing::debug!(
                    "{} [{}.{}] depends_on={:?}",
                    key,
                    fact.major,
                    fact.minor,
                    fact.depends_on
                );
                facts.shared.insert(key, fact);
            }

            for flag in static_flags(lib, &modes) {
                tracing::debug!("{}=True", flag);
                facts.flags.insert(flag);
            }
        }

        facts
    }

    /// Check whether a linkage flag is enabled.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Set every linkage flag on an environment.
    pub fn apply_to(&self, env: &mut Environment) {
        for flag in &self.flags {
            env.set(flag.as_str(), true);
        }
    }
}

/// Key of the shared-library record, if the library is built as one.
pub fn shared_key(lib: &ResolvedLibrary) -> Option<String> {
    match lib.build {
        BuildKind::SharedStrip => Some(format!("USES_{}_STRIP_SO", lib.flag_name())),
        BuildKind::SharedNoStrip => Some(format!("USES_{}_SO", lib.flag_name())),
        _ => None,
    }
}

fn shared_fact(lib: &ResolvedLibrary, modes: &Modes) -> SharedLibFact {
    let (security_info, pkg_info) = if modes.non_mobile {
        (lib.security_info.clone(), lib.pkg_info.clone())
    } else {
        (None, None)
    };

    SharedLibFact {
        name: lib.name.clone(),
        major: lib.major,
        minor: lib.minor,
        depends_on: lib.depends_on.clone(),
        security_info,
        pkg_info,
    }
}

/// Linkage flags for a statically built library.
///
/// The `_ISLAND` variant of the strip flag is set whenever the library is
/// not placed in the island, so island-aware link scripts see a consistent
/// flag either way. Island placement adds its own flag pair.
pub fn static_flags(lib: &ResolvedLibrary, modes: &Modes) -> Vec<String> {
    if !lib.build.is_static() {
        return Vec::new();
    }

    let name = lib.flag_name();
    let suffix = lib.build.env_suffix();
    // only a boolean false keeps the strip flag's island variant; the text
    // "False" just withholds island placement
    let island_disabled = matches!(lib.island, IslandValue::Bool(false));
    let island_opt_out = lib.island.is_explicitly_false();
    let mut flags = Vec::new();

    if let Some(k) = suffix {
        flags.push(format!("USES_{}{}", name, k));
        if !modes.island || island_disabled {
            flags.push(format!("USES_{}_ISLAND{}", name, k));
        }
    }

    if modes.island && !island_opt_out {
        flags.push(format!("USES_{}_ISLAND{}", name, suffix.unwrap_or("")));
        flags.push(format!("USES_{}_ISLAND_PLINK_ISLAND", name));
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::declaration::{IslandValue, LibraryDeclaration};
    use crate::core::env::{GEN_SHARED_LIBS, USES_AUDIO_IN_ISLAND, USES_NON_MOBILE};

    fn lib(build: BuildKind, island: IslandValue) -> ResolvedLibrary {
        ResolvedLibrary {
            name: "gain".to_string(),
            build,
            major: 1,
            minor: 2,
            depends_on: vec!["utils".to_string()],
            security_info: None,
            pkg_info: None,
            island,
            is_private: false,
        }
    }

    fn island_modes() -> Modes {
        Environment::new().with_flag(USES_AUDIO_IN_ISLAND, true).modes()
    }

    #[test]
    fn test_shared_keys() {
        let none = IslandValue::default();
        assert_eq!(shared_key(&lib(BuildKind::SharedStrip, none.clone())).as_deref(), Some("USES_GAIN_STRIP_SO"));
        assert_eq!(shared_key(&lib(BuildKind::SharedNoStrip, none.clone())).as_deref(), Some("USES_GAIN_SO"));
        assert_eq!(shared_key(&lib(BuildKind::SharedNoBuild, none.clone())), None);
        assert_eq!(shared_key(&lib(BuildKind::StaticStrip, none)), None);
    }

    #[test]
    fn test_static_flags_without_island_builds() {
        let modes = Modes::default();
        let flags = static_flags(&lib(BuildKind::StaticStrip, IslandValue::Bool(true)), &modes);
        assert_eq!(flags, vec!["USES_GAIN_STRIP", "USES_GAIN_ISLAND_STRIP"]);

        let flags = static_flags(&lib(BuildKind::StaticNoStrip, IslandValue::Bool(true)), &modes);
        assert!(flags.is_empty());

        let flags = static_flags(&lib(BuildKind::StaticVirtualStub, IslandValue::default()), &modes);
        assert_eq!(flags, vec!["USES_GAIN_STUB", "USES_GAIN_ISLAND_STUB"]);
    }

    #[test]
    fn test_static_flags_with_island_builds() {
        let modes = island_modes();

        let flags = static_flags(&lib(BuildKind::StaticStrip, IslandValue::Bool(true)), &modes);
        assert_eq!(
            flags,
            vec!["USES_GAIN_STRIP", "USES_GAIN_ISLAND_STRIP", "USES_GAIN_ISLAND_PLINK_ISLAND"]
        );

        let flags = static_flags(&lib(BuildKind::StaticNoStrip, IslandValue::Text("True".into())), &modes);
        assert_eq!(flags, vec!["USES_GAIN_ISLAND", "USES_GAIN_ISLAND_PLINK_ISLAND"]);
    }

    #[test]
    fn test_island_opt_out() {
        let modes = island_modes();
        let flags = static_flags(&lib(BuildKind::StaticStrip, IslandValue::Bool(false)), &modes);
        assert_eq!(flags, vec!["USES_GAIN_STRIP", "USES_GAIN_ISLAND_STRIP"]);

        let flags = static_flags(&lib(BuildKind::StaticNoStrip, IslandValue::Bool(false)), &modes);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_island_text_false_only_withholds_placement() {
        let text_false = lib(BuildKind::StaticStrip, IslandValue::Text("False".into()));

        let flags = static_flags(&text_false, &island_modes());
        assert_eq!(flags, vec!["USES_GAIN_STRIP"]);

        // outside island builds it behaves like any other library
        let flags = static_flags(&text_false, &Environment::new().modes());
        assert_eq!(flags, vec!["USES_GAIN_STRIP", "USES_GAIN_ISLAND_STRIP"]);
    }

    #[test]
    fn test_collect() {
        let env = Environment::new()
            .with_flag(GEN_SHARED_LIBS, true)
            .with_flag(USES_NON_MOBILE, true);

        let mut security = IndexMap::new();
        security.insert("domain".to_string(), "audio".to_string());
        let mut secure = LibraryDeclaration::new("secure")
            .with_build("SHARED_BUILD_NO_STRIP")
            .with_version(2, 0);
        secure.security_info = Some(security);
        secure.pkg_info = Some("com.example".to_string());

        let decls = [
            LibraryDeclaration::new("utils").with_build("STATIC_BUILD_STRIP"),
            secure,
            LibraryDeclaration::new("ghost").with_build("SHARED_NO_BUILD").with_version(1, 0),
        ];

        let mut registry = LibraryRegistry::new();
        let mut notices = Vec::new();
        for decl in &decls {
            registry.register(decl, &env, &mut notices).unwrap();
        }

        let facts = LinkageFacts::collect(&registry, &env, &mut notices);
        assert_eq!(facts.shared.len(), 1);
        let fact = &facts.shared["USES_SECURE_SO"];
        assert_eq!((fact.major, fact.minor), (2, 0));
        assert_eq!(fact.pkg_info.as_deref(), Some("com.example"));

        assert!(facts.has_flag("USES_UTILS_STRIP"));
        assert!(facts.has_flag("USES_UTILS_ISLAND_STRIP"));
        assert_eq!(facts.flags.len(), 2);

        let mut out = Environment::new();
        facts.apply_to(&mut out);
        assert!(out.is_set("USES_UTILS_STRIP"));
    }

    #[test]
    fn test_mobile_target_drops_security_info() {
        let mut security = IndexMap::new();
        security.insert("domain".to_string(), "audio".to_string());
        let mut resolved = lib(BuildKind::SharedStrip, IslandValue::default());
        resolved.security_info = Some(security);
        resolved.pkg_info = Some("com.example".to_string());

        let fact = shared_fact(&resolved, &Modes::default());
        assert!(fact.security_info.is_none());
        assert!(fact.pkg_info.is_none());
    }

    #[test]
    fn test_colliding_shared_keys_warn() {
        let env = Environment::new().with_flag(GEN_SHARED_LIBS, true);
        let mut registry = LibraryRegistry::new();
        let mut notices = Vec::new();
        for name in ["dec", "DEC"] {
            let decl = LibraryDeclaration::new(name)
                .with_build("SHARED_BUILD_STRIP")
                .with_version(1, 0);
            registry.register(&decl, &env, &mut notices).unwrap();
        }

        let facts = LinkageFacts::collect(&registry, &env, &mut notices);
        assert_eq!(facts.shared.len(), 1);
        assert_eq!(facts.shared["USES_DEC_STRIP_SO"].name, "dec");
        assert_eq!(notices.len(), 1);
    }
}
