//! `easel build_translations` command

use anyhow::Result;

use easel::builder::BuildContext;
use easel::ops::{build, StageSelection};
use easel::util::process::SystemExecutor;

use crate::cli::GlobalArgs;
use crate::commands::{load_project, settings};

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (_gctx, project) = load_project(global)?;
    let executor = SystemExecutor;
    let ctx = BuildContext::new(&project, settings(global, &project, false, false), &executor);

    let report = build(&ctx, StageSelection::Translations)?;
    if !global.dry_run {
        println!("Compiled {} catalog(s)", report.outputs().count());
    }

    Ok(())
}
