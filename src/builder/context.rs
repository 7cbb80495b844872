//! Build context - layout, settings and tools shared by every stage.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::platform::TargetPlatform;
use crate::core::project::Project;
use crate::util::config::ToolsConfig;
use crate::util::process::{locate_tool, Executor};

/// Directories of the build tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// `build/`
    pub base: PathBuf,
    /// Intermediates: objects, generated wrappers, compiled catalogs.
    pub temp: PathBuf,
    /// Importable tree: the extension module and pure packages.
    pub lib: PathBuf,
    /// Scripts staged for installation.
    pub scripts: PathBuf,
}

impl BuildLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        BuildLayout {
            temp: base.join("temp"),
            lib: base.join("lib"),
            scripts: base.join("scripts"),
            base,
        }
    }

    /// Directories the application runtime must search for modules.
    pub fn lib_dirs(&self) -> Vec<PathBuf> {
        vec![self.lib.clone()]
    }
}

/// Options fixed for the whole invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSettings {
    pub dry_run: bool,
    pub debug: bool,
    pub force: bool,
    pub platform: TargetPlatform,
}

impl BuildSettings {
    pub fn new(platform: TargetPlatform) -> Self {
        BuildSettings {
            dry_run: false,
            debug: false,
            force: false,
            platform,
        }
    }
}

/// Resolved paths of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub pkg_config: PathBuf,
    pub msgfmt: PathBuf,
    pub cxx: PathBuf,
    pub swig: PathBuf,
}

impl Tools {
    /// Config entry, then environment variable, then `PATH`.
    pub fn locate(config: &ToolsConfig) -> Self {
        Tools {
            pkg_config: locate_tool(
                config.pkg_config.as_deref(),
                "PKG_CONFIG",
                &["pkg-config", "pkgconf"],
            ),
            msgfmt: locate_tool(config.msgfmt.as_deref(), "MSGFMT", &["msgfmt"]),
            cxx: locate_tool(config.cxx.as_deref(), "CXX", &["c++", "g++", "clang++"]),
            swig: locate_tool(config.swig.as_deref(), "SWIG", &["swig", "swig4.0", "swig3.0"]),
        }
    }

    /// Bare tool names, resolved by the OS at spawn time.
    pub fn bare() -> Self {
        Tools {
            pkg_config: PathBuf::from("pkg-config"),
            msgfmt: PathBuf::from("msgfmt"),
            cxx: PathBuf::from("c++"),
            swig: PathBuf::from("swig"),
        }
    }
}

/// Files a stage wants installed under the data prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    /// Destination directory relative to the data prefix.
    pub install_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Everything a stage needs to run.
pub struct BuildContext<'a> {
    pub project: &'a Project,
    pub layout: BuildLayout,
    pub settings: BuildSettings,
    pub tools: Tools,
    pub executor: &'a dyn Executor,
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.project.root)
            .field("layout", &self.layout)
            .field("settings", &self.settings)
            .field("tools", &self.tools)
            .finish()
    }
}

impl<'a> BuildContext<'a> {
    /// Create a context for `project` with tools located from its config.
    pub fn new(project: &'a Project, settings: BuildSettings, executor: &'a dyn Executor) -> Self {
        let layout = BuildLayout::new(project.path(&project.manifest.build.base));
        BuildContext {
            project,
            layout,
            settings,
            tools: Tools::locate(&project.config.tools),
            executor,
        }
    }

    /// Replace the located tools.
    pub fn with_tools(mut self, tools: Tools) -> Self {
        self.tools = tools;
        self
    }

    pub fn root(&self) -> &Path {
        &self.project.root
    }

    pub fn platform(&self) -> TargetPlatform {
        self.settings.platform
    }

    pub fn dry_run(&self) -> bool {
        self.settings.dry_run
    }
}
