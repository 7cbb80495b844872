//! Easel.toml manifest parsing and schema.
//!
//! The manifest declares the single extension module, the pure-source
//! packages and scripts, the translation domain, and where things are built
//! and installed. Everything in it is data; the build logic lives in
//! `builder` and `ops`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::error::BuildError;
use crate::core::platform::TargetPlatform;
use crate::util::diagnostic::ManifestParseError;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Easel.toml";

/// The parsed Easel.toml manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Manifest {
    pub package: PackageSection,

    #[serde(default)]
    pub extension: Option<ExtensionSection>,

    #[serde(default)]
    pub translations: Option<TranslationsSection>,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub install: InstallSection,

    #[serde(default)]
    pub version: VersionSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[package]`: metadata plus the pure-source layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PackageSection {
    pub name: String,

    pub version: Version,

    #[serde(default)]
    pub description: Option<String>,

    /// Dotted package names whose `*.py` modules are copied to the build tree.
    #[serde(default)]
    pub packages: Vec<String>,

    /// Extra per-package file globs (package name -> patterns).
    #[serde(default)]
    pub package_data: BTreeMap<String, Vec<String>>,

    /// Script sources, relative to the project root.
    #[serde(default)]
    pub scripts: Vec<PathBuf>,

    /// Script launched by `run_build`; defaults to the first script.
    #[serde(default)]
    pub primary_script: Option<PathBuf>,
}

/// Source language of the extension module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "c")]
    C,
    #[default]
    #[serde(rename = "c++")]
    Cxx,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::C => write!(f, "c"),
            Language::Cxx => write!(f, "c++"),
        }
    }
}

/// `[extension]`: the one native module.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExtensionSection {
    /// Dotted module name, e.g. `_mypaintlib` or `lib._mypaintlib`.
    pub name: String,

    /// Ordered native sources; `.i` files are interface definitions.
    pub sources: Vec<PathBuf>,

    /// pkg-config dependency names.
    #[serde(default)]
    pub packages: Vec<String>,

    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    /// Commands whose trimmed stdout is an extra include directory.
    #[serde(default)]
    pub include_commands: Vec<Vec<String>>,

    #[serde(default)]
    pub library_dirs: Vec<PathBuf>,

    #[serde(default)]
    pub libraries: Vec<String>,

    #[serde(default)]
    pub extra_compile_args: Vec<String>,

    #[serde(default)]
    pub extra_link_args: Vec<String>,

    #[serde(default)]
    pub swig_opts: Vec<String>,

    #[serde(default)]
    pub language: Language,

    /// Module filename suffix; defaults per platform.
    #[serde(default)]
    pub suffix: Option<String>,
}

/// `[translations]`: the one gettext domain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TranslationsSection {
    #[serde(default = "default_po_dir")]
    pub source_dir: PathBuf,

    pub domain: String,
}

fn default_po_dir() -> PathBuf {
    PathBuf::from("po")
}

/// `[build]`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BuildSection {
    #[serde(default = "default_build_base")]
    pub base: PathBuf,

    /// Override the detected platform.
    #[serde(default)]
    pub platform: Option<TargetPlatform>,
}

impl Default for BuildSection {
    fn default() -> Self {
        BuildSection {
            base: default_build_base(),
            platform: None,
        }
    }
}

fn default_build_base() -> PathBuf {
    PathBuf::from("build")
}

/// `[install]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InstallSection {
    /// Default destination for `install_scripts`.
    #[serde(default)]
    pub scripts_dir: Option<PathBuf>,
}

/// `[version]`: where the baked-in version block comes from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct VersionSection {
    /// Command whose stdout is the version block.
    #[serde(default)]
    pub command: Option<Vec<String>>,

    /// Fixed version block text.
    #[serde(default)]
    pub text: Option<String>,
}

/// `[run]`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunSection {
    #[serde(default = "default_search_path_var")]
    pub search_path_var: String,
}

impl Default for RunSection {
    fn default() -> Self {
        RunSection {
            search_path_var: default_search_path_var(),
        }
    }
}

fn default_search_path_var() -> String {
    "PYTHONPATH".to_string()
}

impl Manifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BuildError::io("read manifest", path, e))?;
        Self::parse(&path.display().to_string(), &contents)
    }

    /// Parse and validate manifest text.
    pub fn parse(file: &str, contents: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(contents)
            .map_err(|e| ManifestParseError::from_toml(file, contents, &e))?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.package.name.trim().is_empty() {
            bail!(invalid("`package.name` must not be empty"));
        }

        if let Some(ref ext) = self.extension {
            if ext.name.trim().is_empty() || ext.name.split('.').any(str::is_empty) {
                bail!(invalid(format!(
                    "`extension.name` must be a dotted module name, got `{}`",
                    ext.name
                )));
            }
            if ext.sources.is_empty() {
                bail!(invalid("`extension.sources` must list at least one file"));
            }
            if ext.include_commands.iter().any(Vec::is_empty) {
                bail!(invalid("`extension.include-commands` entries must not be empty"));
            }
        }

        if let Some(ref tr) = self.translations {
            if tr.domain.trim().is_empty() {
                bail!(invalid("`translations.domain` must not be empty"));
            }
        }

        if let Some(ref primary) = self.package.primary_script {
            if !self.package.scripts.contains(primary) {
                bail!(invalid(format!(
                    "`package.primary-script` ({}) is not listed in `package.scripts`",
                    primary.display()
                )));
            }
        }

        if let Some(ref cmd) = self.version.command {
            if cmd.is_empty() {
                bail!(invalid("`version.command` must not be empty"));
            }
        }

        Ok(())
    }

    /// The script `run_build` launches.
    pub fn primary_script(&self) -> Option<&Path> {
        self.package
            .primary_script
            .as_deref()
            .or_else(|| self.package.scripts.first().map(PathBuf::as_path))
    }
}

fn invalid(message: impl Into<String>) -> BuildError {
    BuildError::Configuration {
        message: format!("invalid manifest: {}", message.into()),
    }
}

/// Find `Easel.toml` in `start` or any parent directory.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}
