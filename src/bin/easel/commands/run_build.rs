//! `easel run_build` command

use anyhow::Result;

use easel::builder::BuildContext;
use easel::ops::run_build;
use easel::util::process::SystemExecutor;

use crate::cli::{GlobalArgs, RunBuildArgs};
use crate::commands::{load_project, settings};

pub fn execute(args: RunBuildArgs, global: &GlobalArgs) -> Result<()> {
    let (_gctx, project) = load_project(global)?;
    let executor = SystemExecutor;
    let ctx = BuildContext::new(&project, settings(global, &project, args.debug, false), &executor);

    run_build(&ctx, &args.args)
}
