//! Test fixtures for common declaration scenarios.

use crate::core::declaration::{AmdbDescriptor, LibraryDeclaration};
use crate::core::env::{Environment, GEN_SHARED_LIBS};

/// Environment with shared artifacts enabled and nothing else set.
pub fn shared_env() -> Environment {
    Environment::new().with_flag(GEN_SHARED_LIBS, true)
}

/// A complete CAPI decoder descriptor for `mid`, revision 1.
pub fn decoder_amdb(mid: &str) -> AmdbDescriptor {
    AmdbDescriptor::new("decoder", mid, "capi", "MODULE_ID_DECODER")
        .with_tag("capi_decoder")
        .with_fmt_ids(Some("MEDIA_FMT_ID_MP3"), None)
}

/// A stripped shared library implementing revision `rev` of a decoder.
pub fn decoder_library(name: &str, mid: &str, major: u32, rev: u32) -> LibraryDeclaration {
    LibraryDeclaration::new(name)
        .with_build("SHARED_BUILD_STRIP")
        .with_version(major, 0)
        .with_amdb(decoder_amdb(mid).with_rev(rev))
}

/// JSON declaration file templates.
pub mod declarations {
    /// A plain static library.
    pub fn static_library(name: &str) -> String {
        format!(r#"{{ "lib_name": "{name}", "build": "STATIC_BUILD_STRIP" }}"#)
    }

    /// A shared decoder library, overridable to static by `USES_<NAME>_STATIC`.
    pub fn decoder(name: &str, mid: &str, major: u32, rev: u32) -> String {
        let flag = format!("USES_{}_STATIC", name.to_uppercase());
        format!(
            r#"{{
    "lib_name": "{name}",
    "build": {{ "{flag}": "STATIC_BUILD_NO_STRIP", "DEFAULT": "SHARED_BUILD_STRIP" }},
    "lib_major_ver": {major},
    "lib_minor_ver": 0,
    "amdb_info": {{
        "mtype": "decoder",
        "mid": "{mid}",
        "itype": "capi",
        "module_name": "MODULE_ID_{upper}",
        "tag": "capi_{name}",
        "fmt_id1": "MEDIA_FMT_ID_MP3",
        "rev_num": {rev}
    }}
}}"#,
            upper = name.to_uppercase()
        )
    }

    /// Wrap entries into the array a declaration file holds.
    pub fn file(entries: &[String]) -> String {
        format!("[\n{}\n]\n", entries.join(",\n"))
    }
}
