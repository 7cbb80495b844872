//! easel CLI - build orchestration for an application with a native extension

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use easel::core::error::BuildError;
use easel::util::diagnostic::{emit, ManifestParseError};

mod cli;
mod commands;

use cli::{Cli, Commands, GlobalArgs};

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "EASEL_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let color = !cli.global.no_color && std::io::stderr().is_terminal();
    if let Err(e) = run(cli) {
        report(e, color);
        std::process::exit(1);
    }
}

fn init_logging(global: &GlobalArgs) {
    let default = if global.verbose {
        "easel=debug"
    } else if global.quiet {
        "easel=warn"
    } else {
        "easel=info"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn report(err: anyhow::Error, color: bool) {
    let err = match err.downcast::<ManifestParseError>() {
        Ok(parse) => {
            eprintln!("{:?}", miette::Report::new(parse));
            return;
        }
        Err(err) => err,
    };

    match err.downcast_ref::<BuildError>() {
        Some(build_err) => {
            let mut diag = build_err.to_diagnostic();
            diag.message = format!("{:#}", err);
            emit(&diag, color);
        }
        None => eprintln!("error: {:#}", err),
    }
}

fn run(cli: Cli) -> Result<()> {
    let global = cli.global;

    match cli.command {
        Commands::Build(args) => commands::build::execute(args, &global),
        Commands::BuildExt(args) => commands::build_ext::execute(args, &global),
        Commands::BuildTranslations => commands::build_translations::execute(&global),
        Commands::InstallScripts(args) => commands::install_scripts::execute(args, &global),
        Commands::RunBuild(args) => commands::run_build::execute(args, &global),
        Commands::Flags(args) => commands::flags::execute(args, &global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
