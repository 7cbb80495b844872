//! `easel build_ext` command

use anyhow::Result;

use easel::builder::BuildContext;
use easel::ops::{build, StageSelection};
use easel::util::process::SystemExecutor;

use crate::cli::{BuildArgs, GlobalArgs};
use crate::commands::{load_project, settings};

pub fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let (_gctx, project) = load_project(global)?;

    if project.manifest.extension.is_none() {
        tracing::warn!("no [extension] table in the manifest; nothing to build");
        return Ok(());
    }

    let executor = SystemExecutor;
    let settings = settings(global, &project, args.debug, args.force);
    let ctx = BuildContext::new(&project, settings, &executor);
    build(&ctx, StageSelection::Extension)?;

    Ok(())
}
