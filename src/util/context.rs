//! Global context for easel operations.
//!
//! Provides centralized access to the working directory, the manifest
//! location and the global configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::error::BuildError;
use crate::core::manifest::{find_manifest, MANIFEST_NAME};
use crate::core::project::Project;
use crate::util::config::global_config_path;
use crate::util::fs::absolutize;

/// Process-wide settings gathered from the command line.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Explicit `--manifest-path`
    manifest_path: Option<PathBuf>,

    /// Global config file (~/.easel/config.toml)
    global_config: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            manifest_path: None,
            global_config: global_config_path(),
        }
    }

    /// Use an explicit manifest instead of searching for one.
    pub fn set_manifest_path(&mut self, path: Option<PathBuf>) {
        self.manifest_path = path.map(|p| absolutize(&self.cwd, &p));
    }

    /// Override the global config file (`None` disables it).
    pub fn set_global_config(&mut self, path: Option<PathBuf>) {
        self.global_config = path;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        absolutize(&self.cwd, path)
    }

    /// Locate `Easel.toml`: the explicit path, or the nearest one at or
    /// above the working directory.
    pub fn find_manifest(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.manifest_path {
            if !path.is_file() {
                return Err(BuildError::Configuration {
                    message: format!("manifest `{}` does not exist", path.display()),
                }
                .into());
            }
            return Ok(path.clone());
        }

        find_manifest(&self.cwd).ok_or_else(|| {
            BuildError::Configuration {
                message: format!(
                    "could not find `{}` in `{}` or any parent directory",
                    MANIFEST_NAME,
                    self.cwd.display()
                ),
            }
            .into()
        })
    }

    /// Load the project the command operates on.
    pub fn load_project(&self) -> Result<Project> {
        let manifest_path = self.find_manifest()?;
        tracing::debug!("using manifest {}", manifest_path.display());
        Project::load(&manifest_path, self.global_config.as_deref())
    }
}
