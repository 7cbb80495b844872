//! Pure-source packaging: the `build_py` and `build_scripts` stages.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::builder::pipeline::{Stage, StageId, StageOutput};
use crate::core::error::BuildError;
use crate::util::fs::{copy_file, glob_files, is_stale, make_executable, starts_with};

/// Extension of pure-source modules.
pub const MODULE_PATTERN: &str = "*.py";

/// Interpreter directive marker.
pub const DIRECTIVE_PREFIX: &str = "#!";

/// Directory of a dotted package, relative to the project root.
pub fn package_dir(package: &str) -> PathBuf {
    package.split('.').collect()
}

/// Copy `src` to `dst` unless `dst` is up to date.
///
/// Returns whether a copy was made (or would be, in dry-run).
fn copy_if_stale(src: &Path, dst: &Path, dry_run: bool) -> Result<bool> {
    if !is_stale(dst, &[src])? {
        tracing::debug!("not copying {} (output up-to-date)", src.display());
        return Ok(false);
    }

    if dry_run {
        tracing::info!("would copy {} -> {}", src.display(), dst.display());
    } else {
        tracing::debug!("copying {} -> {}", src.display(), dst.display());
        copy_file(src, dst)?;
    }
    Ok(true)
}

/// The `build_py` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildPyStage;

impl BuildPyStage {
    /// `(source, destination)` pairs for every file of every package.
    pub fn plan(ctx: &BuildContext<'_>) -> Result<Vec<(PathBuf, PathBuf)>> {
        let package_section = &ctx.project.manifest.package;
        let mut pairs = Vec::new();

        for package in &package_section.packages {
            let rel = package_dir(package);
            let src_dir = ctx.project.path(&rel);
            if !src_dir.is_dir() {
                return Err(BuildError::Configuration {
                    message: format!(
                        "package directory `{}` for package `{}` does not exist",
                        src_dir.display(),
                        package
                    ),
                }
                .into());
            }

            let mut patterns = vec![MODULE_PATTERN.to_string()];
            if let Some(extra) = package_section.package_data.get(package) {
                patterns.extend(extra.iter().cloned());
            }

            let dst_dir = ctx.layout.lib.join(&rel);
            for file in glob_files(&src_dir, &patterns)? {
                let rel_file = file.strip_prefix(&src_dir).unwrap_or(&file);
                pairs.push((file.clone(), dst_dir.join(rel_file)));
            }
        }

        Ok(pairs)
    }
}

impl Stage for BuildPyStage {
    fn id(&self) -> StageId {
        StageId::BuildPy
    }

    fn run(&self, ctx: &BuildContext<'_>) -> Result<StageOutput> {
        let mut outputs = Vec::new();
        for (src, dst) in Self::plan(ctx)? {
            if copy_if_stale(&src, &dst, ctx.dry_run())? && !ctx.dry_run() {
                outputs.push(dst);
            }
        }
        Ok(StageOutput {
            outputs,
            data_files: Vec::new(),
        })
    }
}

/// The `build_scripts` stage.
///
/// Staged scripts that start with an interpreter directive are made
/// executable so they can be launched from the build tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildScriptsStage;

impl Stage for BuildScriptsStage {
    fn id(&self) -> StageId {
        StageId::BuildScripts
    }

    fn run(&self, ctx: &BuildContext<'_>) -> Result<StageOutput> {
        let mut outputs = Vec::new();

        for script in &ctx.project.manifest.package.scripts {
            let src = ctx.project.path(script);
            if !src.is_file() {
                return Err(BuildError::Configuration {
                    message: format!("script `{}` does not exist", src.display()),
                }
                .into());
            }
            let Some(name) = src.file_name() else {
                continue;
            };
            let dst = ctx.layout.scripts.join(name);
            if !copy_if_stale(&src, &dst, ctx.dry_run())? || ctx.dry_run() {
                continue;
            }
            if starts_with(&dst, DIRECTIVE_PREFIX.as_bytes())? {
                make_executable(&dst)?;
            }
            outputs.push(dst);
        }

        Ok(StageOutput {
            outputs,
            data_files: Vec::new(),
        })
    }
}
