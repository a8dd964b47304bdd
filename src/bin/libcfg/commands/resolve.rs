//! `libcfg resolve` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::ResolveArgs;
use crate::commands::{print_json, resolve_input};
use libcfg::ops::BuildKindSummary;
use libcfg::resolver::Snapshot;
use libcfg::util::diagnostic::Diagnostic;
use libcfg::util::hash;
use libcfg::util::GlobalContext;

#[derive(Serialize)]
struct ResolveReport<'a> {
    fingerprint: String,
    summary: BuildKindSummary,
    #[serde(flatten)]
    snapshot: Snapshot<'a>,
    notices: &'a [Diagnostic],
}

pub fn execute(ctx: &GlobalContext, args: ResolveArgs) -> Result<()> {
    let resolution = resolve_input(ctx, &args.input)?;
    let summary = BuildKindSummary::from_resolution(&resolution);
    let fingerprint = resolution.fingerprint();

    if args.input.json {
        return print_json(&ResolveReport {
            fingerprint,
            summary,
            snapshot: resolution.snapshot(),
            notices: &resolution.notices,
        });
    }

    println!(
        "Resolved {} libraries and {} modules (fingerprint {})",
        resolution.libraries.len(),
        resolution.modules.len(),
        hash::short(&fingerprint)
    );

    for (label, counts) in [
        ("with a module", &summary.with_module),
        ("without a module", &summary.without_module),
    ] {
        if counts.is_empty() {
            continue;
        }
        println!();
        println!("Libraries {}:", label);
        for (kind, count) in counts {
            println!("  {:<26} {}", kind, count);
        }
    }

    if args.libraries {
        println!();
        println!("Libraries:");
        for lib in resolution.libraries.iter() {
            let version = match lib.so_file_name() {
                Some(file) => format!(" -> {}", file),
                None => String::new(),
            };
            println!("  {} [{}]{}", lib.name, lib.build, version);
        }
    }

    if ctx.is_verbose() && !resolution.notices.is_empty() {
        println!();
        for notice in &resolution.notices {
            print!("{}", notice.format(ctx.use_color()));
        }
    }

    let warnings = resolution.warning_count();
    if warnings > 0 {
        println!();
        println!("{} warning(s) emitted", warnings);
    }

    Ok(())
}
