//! A loaded project: manifest, root directory, tool config and platform.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::manifest::Manifest;
use crate::core::platform::TargetPlatform;
use crate::util::config::{load_config, project_config_path, Config};

/// Everything read from disk once per invocation.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory containing the manifest.
    pub root: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub config: Config,
    pub platform: TargetPlatform,
}

impl Project {
    /// Load the manifest at `manifest_path` and the tool config around it.
    pub fn load(manifest_path: &Path, global_config: Option<&Path>) -> Result<Self> {
        let manifest = Manifest::load(manifest_path)?;
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let config = load_config(global_config, &project_config_path(&root));
        Ok(Self::from_parts(root, manifest_path.to_path_buf(), manifest, config))
    }

    /// Assemble a project from already-parsed pieces.
    pub fn from_parts(
        root: PathBuf,
        manifest_path: PathBuf,
        manifest: Manifest,
        config: Config,
    ) -> Self {
        let platform = manifest.build.platform.unwrap_or_else(TargetPlatform::host);
        tracing::debug!("target platform: {}", platform);

        Project {
            root,
            manifest_path,
            manifest,
            config,
            platform,
        }
    }

    /// Override the platform (tests and cross-platform dry runs).
    pub fn with_platform(mut self, platform: TargetPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Resolve a manifest-relative path.
    pub fn path(&self, rel: &Path) -> PathBuf {
        crate::util::fs::absolutize(&self.root, rel)
    }
}
