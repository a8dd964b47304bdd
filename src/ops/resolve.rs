//! Declaration resolution operations.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;

use crate::core::build_kind::BuildKind;
use crate::core::env::Environment;
use crate::ops::load::load_declarations;
use crate::resolver::{Resolution, ResolveOptions, Resolver};
use crate::util::config::DEFAULT_PATTERN;
use crate::util::GlobalContext;

/// Where to read declarations and which flags to resolve them against.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub dir: PathBuf,
    pub pattern: String,
    pub recursive: bool,
    pub env: Environment,
    pub options: ResolveOptions,
}

impl ResolveRequest {
    /// Create a request with default discovery settings and no flags.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ResolveRequest {
            dir: dir.into(),
            pattern: DEFAULT_PATTERN.to_string(),
            recursive: false,
            env: Environment::new(),
            options: ResolveOptions::default(),
        }
    }

    /// Build a request from the effective configuration.
    ///
    /// `defines` are `NAME[=bool]` flag definitions layered over the
    /// configured `[env] flags`.
    pub fn from_context(
        ctx: &GlobalContext,
        dir: Option<&Path>,
        defines: &[String],
    ) -> Result<Self> {
        let config = ctx.config();

        let mut env = config.env.flags.clone();
        for define in defines {
            env.define(define)
                .map_err(|e| anyhow::anyhow!("invalid flag definition: {}", e))?;
        }

        Ok(ResolveRequest {
            dir: ctx.declaration_dir(dir),
            pattern: config.input.pattern().to_string(),
            recursive: config.input.recursive,
            env,
            options: config.resolve_options(),
        })
    }
}

/// Load the declarations of a request and resolve them.
///
/// Loader notices come first in the returned resolution.
pub fn resolve_declarations(request: &ResolveRequest) -> Result<Resolution> {
    let loaded = load_declarations(&request.dir, &request.pattern, request.recursive)
        .with_context(|| format!("failed to load declarations from {}", request.dir.display()))?;
    for notice in &loaded.notices {
        notice.log();
    }
    tracing::info!(
        "loaded {} declarations from {} files",
        loaded.declarations.len(),
        loaded.files.len()
    );

    let mut resolution = Resolver::run(request.env.clone(), request.options, loaded.declarations)?;

    let mut notices = loaded.notices;
    notices.append(&mut resolution.notices);
    resolution.notices = notices;

    Ok(resolution)
}

/// Number of libraries per resolved build kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildKindSummary {
    /// Libraries that implement a module
    pub with_module: IndexMap<BuildKind, usize>,
    /// Plain libraries
    pub without_module: IndexMap<BuildKind, usize>,
}

impl BuildKindSummary {
    /// Count the libraries of a resolution.
    pub fn from_resolution(resolution: &Resolution) -> Self {
        let module_libraries: HashSet<&str> = resolution
            .modules
            .iter()
            .flat_map(|entry| entry.revisions())
            .map(|rev| rev.library.as_str())
            .collect();

        let mut summary = BuildKindSummary::default();
        for lib in resolution.libraries.iter() {
            let counter = if module_libraries.contains(lib.name.as_str()) {
                &mut summary.with_module
            } else {
                &mut summary.without_module
            };
            *counter.entry(lib.build).or_insert(0) += 1;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::GEN_SHARED_LIBS;
    use crate::resolver::ResolveError;
    use tempfile::TempDir;

    const DECLARATIONS: &str = r#"[
        { "lib_name": "audio_utils", "build": "STATIC_BUILD_STRIP" },
        {
            "lib_name": "mp3_dec",
            "build": { "USES_MP3_STATIC": "STATIC_BUILD_NO_STRIP", "DEFAULT": "SHARED_BUILD_STRIP" },
            "lib_major_ver": 1,
            "lib_minor_ver": 0,
            "amdb_info": {
                "mtype": "decoder",
                "mid": "0x10",
                "itype": "capi",
                "module_name": "MODULE_ID_MP3_DECODER",
                "tag": "capi_mp3_dec",
                "fmt_id1": "MEDIA_FMT_ID_MP3"
            }
        }
    ]"#;

    fn workspace() -> TempDir {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("libs.json"), DECLARATIONS).unwrap();
        std::fs::write(tmp.path().join("empty.json"), "[]").unwrap();
        tmp
    }

    #[test]
    fn test_resolve_declarations() {
        let tmp = workspace();
        let mut request = ResolveRequest::new(tmp.path());
        request.env.set(GEN_SHARED_LIBS, true);

        let resolution = resolve_declarations(&request).unwrap();
        assert_eq!(resolution.libraries.len(), 2);
        assert_eq!(resolution.modules.len(), 1);
        assert!(resolution.linkage.shared.contains_key("USES_MP3_DEC_STRIP_SO"));

        // the empty file note comes from the loader
        assert!(resolution.notices[0].message.contains("empty.json"));

        let summary = BuildKindSummary::from_resolution(&resolution);
        assert_eq!(summary.with_module.get(&BuildKind::SharedStrip), Some(&1));
        assert_eq!(summary.without_module.get(&BuildKind::StaticStrip), Some(&1));
    }

    #[test]
    fn test_resolution_error_is_kept() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("libs.json"),
            r#"[{"lib_name": "x", "build": "SHARED_BUILD_STRIP", "amdb_info": {"mtype": "generic"}}]"#,
        )
        .unwrap();

        let mut request = ResolveRequest::new(tmp.path());
        request.env.set(GEN_SHARED_LIBS, true);
        let err = resolve_declarations(&request).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::Schema { .. })
        ));
    }

    #[test]
    fn test_request_from_context() {
        let tmp = workspace();
        let cfg_dir = tmp.path().join(".libcfg");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[input]\ndir = \".\"\n\n[env.flags]\nGEN_SHARED_LIBS = true\nUSES_MP3_STATIC = false\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        let defines = vec!["USES_MP3_STATIC".to_string()];
        let request = ResolveRequest::from_context(&ctx, None, &defines).unwrap();
        assert!(request.env.is_set("USES_MP3_STATIC"));

        let resolution = resolve_declarations(&request).unwrap();
        assert_eq!(
            resolution.libraries.get("mp3_dec").unwrap().build,
            BuildKind::StaticNoStrip
        );

        let bad = vec!["USES_X=maybe".to_string()];
        assert!(ResolveRequest::from_context(&ctx, None, &bad).is_err());
    }
}
