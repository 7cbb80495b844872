//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// easel - build orchestration for an application with a native extension
#[derive(Parser)]
#[command(name = "easel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command.
#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Announce what would be done without doing it
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Path to Easel.toml (default: search upward from the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build everything: extension, packages, scripts and translations
    Build(BuildArgs),

    /// Build the native extension module only
    #[command(name = "build_ext")]
    BuildExt(BuildArgs),

    /// Compile message catalogs only
    #[command(name = "build_translations")]
    BuildTranslations,

    /// Install scripts with a version header baked in
    #[command(name = "install_scripts")]
    InstallScripts(InstallScriptsArgs),

    /// Build, then run the application out of the build tree
    #[command(name = "run_build", visible_alias = "testdrive")]
    RunBuild(RunBuildArgs),

    /// Show the resolved compile/link flags of the extension
    Flags(FlagsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Compile with debug flags instead of optimizing
    #[arg(short = 'g', long)]
    pub debug: bool,

    /// Rebuild even if the extension is up to date
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct InstallScriptsArgs {
    /// Destination directory (default: `install.scripts-dir`)
    #[arg(long, short = 'd', value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Do not run build_scripts first
    #[arg(long)]
    pub skip_build: bool,

    /// Write a JSON record of installed files
    #[arg(long, value_name = "FILE")]
    pub record: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunBuildArgs {
    /// Build the extension with debug flags
    #[arg(short = 'g', long)]
    pub debug: bool,

    /// Arguments passed to the application
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Show compile flags only
    #[arg(long, conflicts_with = "link")]
    pub compile: bool,

    /// Show link flags only
    #[arg(long)]
    pub link: bool,

    /// Resolve with debug flags
    #[arg(short = 'g', long)]
    pub debug: bool,

    /// Print the flag set as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
