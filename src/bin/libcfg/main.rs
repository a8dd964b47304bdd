//! libcfg CLI - library and module configuration resolver

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use libcfg::util::diagnostic;
use libcfg::{GlobalContext, ResolveError};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ResolveError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("libcfg=debug")
    } else {
        EnvFilter::new("libcfg=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = GlobalContext::new()?;
    if let Some(path) = &cli.config {
        ctx = ctx.with_config_file(path)?;
    }
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color && std::io::stdout().is_terminal());

    // Execute command
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(&ctx, args),
        Commands::Modules(args) => commands::modules::execute(&ctx, args),
        Commands::Linkage(args) => commands::linkage::execute(&ctx, args),
        Commands::Catalog(args) => commands::catalog::execute(&ctx, args),
    }
}
