//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// libcfg - resolve library and module declarations for code generation
#[derive(Parser)]
#[command(name = "libcfg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Extra config file layered over the global and project configs
    #[arg(long, global = true, env = "LIBCFG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve declarations and summarize the result
    Resolve(ResolveArgs),

    /// List registered modules and their revisions
    Modules(ModulesArgs),

    /// Show derived linkage facts
    Linkage(LinkageArgs),

    /// Show the module catalog or the loader tables
    Catalog(CatalogArgs),
}

/// Options shared by every command that runs a resolution.
#[derive(Args)]
pub struct InputArgs {
    /// Directory containing the declaration files
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Set an environment flag (NAME, NAME=true or NAME=false)
    #[arg(short = 'D', long = "define", value_name = "NAME[=BOOL]")]
    pub defines: Vec<String>,

    /// Fail when a module has no built revision
    #[arg(long)]
    pub require_built: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// List every resolved library
    #[arg(long)]
    pub libraries: bool,
}

#[derive(Args)]
pub struct ModulesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only show the module with this id (hex or decimal)
    #[arg(long)]
    pub mid: Option<String>,
}

#[derive(Args)]
pub struct LinkageArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only print the derived flag names
    #[arg(long)]
    pub flags_only: bool,
}

#[derive(Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Show the loader tables instead of the catalog
    #[arg(long)]
    pub loader: bool,
}
