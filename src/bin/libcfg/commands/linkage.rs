//! `libcfg linkage` command

use anyhow::Result;

use crate::cli::LinkageArgs;
use crate::commands::{print_json, resolve_input};
use libcfg::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: LinkageArgs) -> Result<()> {
    let resolution = resolve_input(ctx, &args.input)?;
    let linkage = &resolution.linkage;

    if args.input.json {
        return if args.flags_only {
            print_json(&linkage.flags)
        } else {
            print_json(linkage)
        };
    }

    if args.flags_only {
        for flag in &linkage.flags {
            println!("{}", flag);
        }
        return Ok(());
    }

    println!("Shared libraries:");
    if linkage.shared.is_empty() {
        println!("  (none)");
    }
    for (key, fact) in &linkage.shared {
        println!("  {} = {} {}.{}", key, fact.name, fact.major, fact.minor);
        if !fact.depends_on.is_empty() {
            println!("      depends on: {}", fact.depends_on.join(", "));
        }
    }

    println!();
    println!("Static flags:");
    if linkage.flags.is_empty() {
        println!("  (none)");
    }
    for flag in &linkage.flags {
        println!("  {}", flag);
    }

    Ok(())
}
