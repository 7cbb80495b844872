//! `easel install_scripts` command

use anyhow::Result;

use easel::builder::BuildContext;
use easel::ops::{install_scripts, InstallScriptsOptions};
use easel::util::process::SystemExecutor;

use crate::cli::{GlobalArgs, InstallScriptsArgs};
use crate::commands::{load_project, settings};

pub fn execute(args: InstallScriptsArgs, global: &GlobalArgs) -> Result<()> {
    let (gctx, project) = load_project(global)?;
    let executor = SystemExecutor;
    let ctx = BuildContext::new(&project, settings(global, &project, false, false), &executor);

    let opts = InstallScriptsOptions {
        install_dir: args.install_dir.as_deref().map(|p| gctx.resolve_path(p)),
        skip_build: args.skip_build,
        record: args.record.as_deref().map(|p| gctx.resolve_path(p)),
    };

    let installed = install_scripts(&ctx, &opts)?;
    for script in &installed {
        println!("{}", script.path.display());
    }

    Ok(())
}
