//! `libcfg catalog` command

use anyhow::Result;

use crate::cli::CatalogArgs;
use crate::commands::{print_json, resolve_input};
use libcfg::ops::catalog::{c_identifier, catalog_entries, LoaderTable};
use libcfg::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: CatalogArgs) -> Result<()> {
    let resolution = resolve_input(ctx, &args.input)?;

    if args.loader {
        let table = LoaderTable::build(&resolution.modules, &resolution.env);
        if args.input.json {
            return print_json(&table);
        }
        print_loader(&table);
        return Ok(());
    }

    let entries = catalog_entries(&resolution.modules);
    if args.input.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("(catalog is empty)");
    }
    for entry in &entries {
        println!(
            "{:#x} {:<10} {:<8} {} fmt_id1={} fmt_id2={}",
            entry.mid, entry.module_type, entry.build_type, entry.name, entry.fmt_id1, entry.fmt_id2
        );
    }

    Ok(())
}

fn print_loader(table: &LoaderTable) {
    let counts = table.counts();

    println!("Dynamic CAPI modules ({}):", counts.dynamic_capi);
    for row in &table.dynamic_capi {
        println!(
            "  {:#x} {} rev {} {} ({}) {}",
            row.mid,
            row.module_type,
            row.revision,
            row.filename,
            c_identifier(&row.filename),
            row.tag
        );
    }

    println!("Static CAPI modules ({}):", counts.static_capi);
    for row in &table.static_capi {
        match (&row.get_static_properties, &row.init) {
            (Some(props), Some(init)) => {
                println!("  {:#x} {} {} {}", row.mid, row.module_type, props, init)
            }
            _ => println!("  {:#x} {}", row.mid, row.module_type),
        }
    }

    println!("Virtual stub modules ({}):", counts.virtual_stub);
    for row in &table.virtual_stub {
        println!("  {:#x} {}", row.mid, row.module_type);
    }

    if counts.private_dynamic_capi + counts.private_static_capi > 0 {
        println!(
            "Private modules: {} dynamic, {} static",
            counts.private_dynamic_capi, counts.private_static_capi
        );
        for row in &table.private_dynamic_capi {
            println!("  {:#x} {} rev {} {}", row.mid, row.module_type, row.revision, row.filename);
        }
        for row in &table.private_static_capi {
            println!("  {:#x} {}", row.mid, row.module_type);
        }
    }

    if table.framework_placeholders {
        println!("Framework placeholder tables enabled");
    }
}
