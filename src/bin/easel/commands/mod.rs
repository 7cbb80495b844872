//! Command implementations.

pub mod build;
pub mod build_ext;
pub mod build_translations;
pub mod completions;
pub mod flags;
pub mod install_scripts;
pub mod run_build;

use anyhow::Result;

use easel::builder::BuildSettings;
use easel::{GlobalContext, Project};

use crate::cli::GlobalArgs;

/// Set up the global context and load the project it points at.
pub fn load_project(global: &GlobalArgs) -> Result<(GlobalContext, Project)> {
    let mut gctx = GlobalContext::new()?;
    gctx.set_manifest_path(global.manifest_path.clone());

    let project = gctx.load_project()?;
    Ok((gctx, project))
}

/// Build settings for a command run against `project`.
pub fn settings(global: &GlobalArgs, project: &Project, debug: bool, force: bool) -> BuildSettings {
    BuildSettings {
        dry_run: global.dry_run,
        debug,
        force,
        ..BuildSettings::new(project.platform)
    }
}
