//! `libcfg modules` command

use anyhow::Result;

use crate::cli::ModulesArgs;
use crate::commands::{print_json, resolve_input};
use libcfg::core::module::parse_mid;
use libcfg::registry::ModuleEntry;
use libcfg::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: ModulesArgs) -> Result<()> {
    let resolution = resolve_input(ctx, &args.input)?;

    let entries: Vec<&ModuleEntry> = match &args.mid {
        Some(mid) => {
            let mid = parse_mid(mid)?;
            let entry = resolution.modules.get(mid).ok_or_else(|| {
                anyhow::anyhow!(
                    "no module with id {:#x}\n\
                     help: Run `libcfg modules` to list registered modules",
                    mid
                )
            })?;
            vec![entry]
        }
        None => resolution.modules.iter().collect(),
    };

    if args.input.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("(no modules registered)");
        return Ok(());
    }

    for entry in entries {
        println!("{:#x} {} ({} revisions)", entry.id.mid, entry.id.module_type, entry.len());
        for rev in entry.revisions() {
            let file = rev.filename.as_deref().unwrap_or("-");
            println!(
                "  rev {:<3} {:<13} {:<12} {} [{}] {}",
                rev.revision,
                rev.built_type(),
                rev.interface_type,
                rev.library,
                rev.build,
                file
            );
        }
    }

    Ok(())
}
