//! Configuration file support for easel.
//!
//! Two configuration file locations are consulted:
//! - Global: `~/.easel/config.toml` - User-wide defaults
//! - Project: `.easel/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Tool paths set here
//! take precedence over the `PKG_CONFIG`, `MSGFMT`, `CXX` and `SWIG`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// User configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool overrides
    pub tools: ToolsConfig,
}

/// Paths to the external tools a build invokes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolsConfig {
    /// Package-config tool (e.g. /usr/bin/pkgconf)
    pub pkg_config: Option<PathBuf>,

    /// Message catalog compiler
    pub msgfmt: Option<PathBuf>,

    /// C++ compiler driver used for compiling and linking the extension
    pub cxx: Option<PathBuf>,

    /// Interface wrapper generator
    pub swig: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.tools.pkg_config.is_some() {
            self.tools.pkg_config = other.tools.pkg_config;
        }
        if other.tools.msgfmt.is_some() {
            self.tools.msgfmt = other.tools.msgfmt;
        }
        if other.tools.cxx.is_some() {
            self.tools.cxx = other.tools.cxx;
        }
        if other.tools.swig.is_some() {
            self.tools.swig = other.tools.swig;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.easel/config.toml)
/// 2. Global config (~/.easel/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global easel config directory (~/.easel).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".easel"))
}

/// Get the global config path (~/.easel/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.easel/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".easel").join("config.toml")
}
