//! Producers of the version block baked into installed scripts.
//!
//! The block is opaque text as far as the installer is concerned; it is
//! pasted verbatim below the "do not edit" header.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::Repository;

use crate::core::project::Project;
use crate::util::process::{check_output, Executor, ProcessBuilder};

/// Prefix of the revision identifier written by [`GitVersionInfo`].
pub const REVISION_PREFIX: &str = "git";

/// Something that can produce the version-info block.
pub trait VersionInfo {
    fn release_info_script(&self) -> Result<String>;
}

/// Fixed text.
#[derive(Debug, Clone)]
pub struct StaticVersionInfo {
    text: String,
}

impl StaticVersionInfo {
    pub fn new(text: impl Into<String>) -> Self {
        StaticVersionInfo { text: text.into() }
    }
}

impl VersionInfo for StaticVersionInfo {
    fn release_info_script(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// The stdout of a project-defined command.
pub struct CommandVersionInfo<'a> {
    command: Vec<String>,
    cwd: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> CommandVersionInfo<'a> {
    pub fn new(command: Vec<String>, cwd: impl Into<PathBuf>, executor: &'a dyn Executor) -> Self {
        CommandVersionInfo {
            command,
            cwd: cwd.into(),
            executor,
        }
    }
}

impl VersionInfo for CommandVersionInfo<'_> {
    fn release_info_script(&self) -> Result<String> {
        let (program, args) = self
            .command
            .split_first()
            .context("version command is empty")?;

        let cmd = ProcessBuilder::new(program).args(args).cwd(&self.cwd);
        let output = check_output(self.executor, &cmd)?;
        Ok(output.stdout.trim_end().to_string())
    }
}

/// `BUILD_VERSION` from the manifest plus the git revision when available.
#[derive(Debug, Clone)]
pub struct GitVersionInfo {
    version: String,
    root: PathBuf,
}

impl GitVersionInfo {
    pub fn new(version: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        GitVersionInfo {
            version: version.into(),
            root: root.into(),
        }
    }
}

impl VersionInfo for GitVersionInfo {
    fn release_info_script(&self) -> Result<String> {
        let mut block = format!("BUILD_VERSION = \"{}\"", self.version);
        match short_revision(&self.root) {
            Some(rev) => {
                block.push_str(&format!("\nBUILD_REVISION = \"{}{}\"", REVISION_PREFIX, rev));
            }
            None => tracing::debug!("{} is not in a git repository", self.root.display()),
        }
        Ok(block)
    }
}

/// Abbreviated id of the commit `HEAD` points at.
fn short_revision(root: &Path) -> Option<String> {
    let repo = Repository::discover(root).ok()?;
    let head = repo.head().ok()?;
    let commit = head.peel_to_commit().ok()?;
    let short = commit.as_object().short_id().ok()?;
    short.as_str().map(str::to_string)
}

/// Pick the producer a project asks for.
///
/// `[version] text` wins over `[version] command`; with neither, the git
/// producer is used.
pub fn for_project<'a>(project: &Project, executor: &'a dyn Executor) -> Box<dyn VersionInfo + 'a> {
    let section = &project.manifest.version;

    if let Some(ref text) = section.text {
        return Box::new(StaticVersionInfo::new(text.clone()));
    }

    if let Some(ref command) = section.command {
        return Box::new(CommandVersionInfo::new(
            command.clone(),
            project.root.clone(),
            executor,
        ));
    }

    Box::new(GitVersionInfo::new(
        project.manifest.package.version.to_string(),
        project.root.clone(),
    ))
}
