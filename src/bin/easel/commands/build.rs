//! `easel build` command

use anyhow::Result;

use easel::builder::BuildContext;
use easel::ops::{build, StageSelection};
use easel::util::process::SystemExecutor;

use crate::cli::{BuildArgs, GlobalArgs};
use crate::commands::{load_project, settings};

pub fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let (_gctx, project) = load_project(global)?;
    let executor = SystemExecutor;
    let settings = settings(global, &project, args.debug, args.force);
    let ctx = BuildContext::new(&project, settings, &executor);

    let report = build(&ctx, StageSelection::All)?;

    for data in &report.data_files {
        for file in &data.files {
            tracing::debug!("data file {} -> {}", file.display(), data.install_dir.display());
        }
    }

    Ok(())
}
