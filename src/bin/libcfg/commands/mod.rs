//! Command implementations

pub mod catalog;
pub mod linkage;
pub mod modules;
pub mod resolve;

use anyhow::Result;
use serde::Serialize;

use crate::cli::InputArgs;
use libcfg::ops::{resolve_declarations, ResolveRequest};
use libcfg::util::GlobalContext;
use libcfg::Resolution;

/// Run a resolution with the command-line overrides applied.
pub fn resolve_input(ctx: &GlobalContext, input: &InputArgs) -> Result<Resolution> {
    let mut request = ResolveRequest::from_context(ctx, input.dir.as_deref(), &input.defines)?;
    if input.require_built {
        request.options.require_built_revision = true;
    }
    tracing::debug!("resolving {} with flags {}", request.dir.display(), request.env);
    resolve_declarations(&request)
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
