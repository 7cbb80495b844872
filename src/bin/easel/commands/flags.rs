//! `easel flags` command
//!
//! Print the resolved compile and link flags of the native extension.

use anyhow::Result;

use easel::builder::BuildContext;
use easel::builder::CompileUnit;
use easel::ops::compile_unit;
use easel::util::process::SystemExecutor;

use crate::cli::{FlagsArgs, GlobalArgs};
use crate::commands::{load_project, settings};

pub fn execute(args: FlagsArgs, global: &GlobalArgs) -> Result<()> {
    let (_gctx, project) = load_project(global)?;
    let executor = SystemExecutor;
    let ctx = BuildContext::new(&project, settings(global, &project, args.debug, false), &executor);

    let Some(unit) = compile_unit(&ctx)? else {
        anyhow::bail!("no [extension] table in `{}`", project.manifest_path.display());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&unit.flag_set())?);
        return Ok(());
    }

    let show_compile = !args.link;
    let show_link = !args.compile;

    let mut parts = Vec::new();
    if show_compile {
        parts.extend(compile_flags(&unit));
    }
    if show_link {
        parts.extend(link_flags(&unit));
    }

    println!("{}", parts.join(" "));
    Ok(())
}

fn compile_flags(unit: &CompileUnit) -> Vec<String> {
    unit.include_dirs
        .iter()
        .map(|d| format!("-I{}", d.display()))
        .chain(unit.extra_compile_args.iter().cloned())
        .collect()
}

fn link_flags(unit: &CompileUnit) -> Vec<String> {
    unit.library_dirs
        .iter()
        .map(|d| format!("-L{}", d.display()))
        .chain(unit.libraries.iter().map(|l| format!("-l{}", l)))
        .chain(unit.extra_link_args.iter().cloned())
        .collect()
}
