//! Implementation of `easel run_build` (alias `testdrive`).
//!
//! Builds everything, then launches the primary script out of the build
//! tree with the module search path pointing at the build libraries.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;

use crate::builder::BuildContext;
use crate::core::error::BuildError;
use crate::core::platform::TargetPlatform;
use crate::ops::easel_build::{build, StageSelection};
use crate::util::process::{check_call, ProcessBuilder};

/// Join `dirs` in front of an existing search path.
pub fn search_path_value(
    dirs: &[PathBuf],
    existing: Option<&str>,
    platform: TargetPlatform,
) -> String {
    let mut parts: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
    if let Some(existing) = existing.filter(|s| !s.is_empty()) {
        parts.push(existing.to_string());
    }
    parts.join(platform.path_separator())
}

/// Launches the built application.
pub struct RunHarness<'a> {
    ctx: &'a BuildContext<'a>,
    existing_search_path: Option<String>,
}

impl<'a> RunHarness<'a> {
    /// Harness that extends the search path from the current environment.
    pub fn new(ctx: &'a BuildContext<'a>) -> Self {
        let var = &ctx.project.manifest.run.search_path_var;
        let existing = std::env::var_os(var).map(|v: OsString| v.to_string_lossy().into_owned());
        RunHarness {
            ctx,
            existing_search_path: existing,
        }
    }

    /// Use `existing` as the inherited search path instead of the environment.
    pub fn with_existing_search_path(mut self, existing: Option<String>) -> Self {
        self.existing_search_path = existing;
        self
    }

    /// Staged path of the primary script.
    pub fn script_path(&self) -> Result<PathBuf> {
        let primary = self
            .ctx
            .project
            .manifest
            .primary_script()
            .ok_or_else(|| BuildError::Configuration {
                message: "no scripts declared in `package.scripts`; nothing to run".to_string(),
            })?;
        let name = primary.file_name().unwrap_or(primary.as_os_str());
        Ok(self.ctx.layout.scripts.join(name))
    }

    /// The launch command.
    pub fn command(&self, args: &[String]) -> Result<ProcessBuilder> {
        let script = self.script_path()?;
        let var = &self.ctx.project.manifest.run.search_path_var;
        let value = search_path_value(
            &self.ctx.layout.lib_dirs(),
            self.existing_search_path.as_deref(),
            self.ctx.platform(),
        );

        Ok(ProcessBuilder::new(&script)
            .args(args)
            .env(var, value)
            .cwd(self.ctx.root()))
    }

    /// Build, then run the primary script to completion.
    pub fn run(&self, args: &[String]) -> Result<()> {
        build(self.ctx, StageSelection::All)?;

        let cmd = self.command(args)?;
        if self.ctx.dry_run() {
            tracing::info!("would run {}", cmd.display_command());
            return Ok(());
        }

        tracing::info!("running {}", cmd.display_command());
        check_call(self.ctx.executor, &cmd)
    }
}

/// Convenience wrapper used by the CLI.
pub fn run_build(ctx: &BuildContext<'_>, args: &[String]) -> Result<()> {
    RunHarness::new(ctx).run(args)
}
