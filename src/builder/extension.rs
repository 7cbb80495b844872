//! Compile specification for the native extension module.
//!
//! [`ExtensionCompileSpec`] combines the manifest's `[extension]` table,
//! platform policy and pkg-config output into a [`CompileUnit`]. The build
//! mode is layered on afterwards by [`CompileUnit::with_mode`], which never
//! mutates the base unit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::flags::{FlagCategory, FlagResolver, ResolvedFlagSet};
use crate::core::manifest::{ExtensionSection, Language};
use crate::core::platform::TargetPlatform;
use crate::util::fs::absolutize;
use crate::util::process::{check_output, Executor, ProcessBuilder};

/// Compiler/linker flag enabling OpenMP.
pub const OPENMP_FLAG: &str = "-fopenmp";

/// Link arguments that make the module find its libraries next to itself.
pub const ORIGIN_RPATH_ARGS: [&str; 2] = ["-Wl,-z,origin", "-Wl,-rpath,$ORIGIN"];

/// Platform-dependent `(compile, link)` arguments.
pub fn platform_args(platform: TargetPlatform) -> (Vec<String>, Vec<String>) {
    let mut compile = Vec::new();
    let mut link = Vec::new();

    if platform.uses_openmp() {
        compile.push(OPENMP_FLAG.to_string());
        link.push(OPENMP_FLAG.to_string());
    }
    if platform.uses_origin_rpath() {
        link.extend(ORIGIN_RPATH_ARGS.iter().map(|s| s.to_string()));
    }

    (compile, link)
}

/// Mode-dependent `(compile, link)` arguments.
pub fn mode_args(debug: bool) -> (Vec<String>, Vec<String>) {
    if debug {
        (
            vec!["-O0".into(), "-g".into(), "-DHEAVY_DEBUG".into()],
            vec!["-O0".into()],
        )
    } else {
        (vec!["-O3".into()], vec!["-O3".into()])
    }
}

/// Everything needed to build the extension module once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileUnit {
    /// Dotted module name.
    pub name: String,
    /// Ordered sources; interface files are still listed as `.i`.
    pub sources: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    pub libraries: Vec<String>,
    pub extra_compile_args: Vec<String>,
    pub extra_link_args: Vec<String>,
    pub swig_opts: Vec<String>,
    pub language: Language,
    /// Module filename suffix, including the dot.
    pub suffix: String,
}

impl CompileUnit {
    /// A copy of this unit with the debug or release flags appended.
    pub fn with_mode(&self, debug: bool) -> CompileUnit {
        let (compile, link) = mode_args(debug);
        let mut unit = self.clone();
        unit.extra_compile_args.extend(compile);
        unit.extra_link_args.extend(link);
        unit
    }

    /// Module path relative to the build library directory.
    pub fn module_path(&self) -> PathBuf {
        let mut path: PathBuf = self.name.split('.').collect();
        let file = format!(
            "{}{}",
            path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default(),
            self.suffix
        );
        path.set_file_name(file);
        path
    }

    /// The flags in resolver form.
    pub fn flag_set(&self) -> ResolvedFlagSet {
        ResolvedFlagSet {
            include_dirs: self.include_dirs.iter().map(|p| p.display().to_string()).collect(),
            library_dirs: self.library_dirs.iter().map(|p| p.display().to_string()).collect(),
            libraries: self.libraries.clone(),
            extra_compile_args: self.extra_compile_args.clone(),
            extra_link_args: self.extra_link_args.clone(),
        }
    }
}

/// Builds a [`CompileUnit`] from the manifest.
pub struct ExtensionCompileSpec<'a> {
    section: &'a ExtensionSection,
    root: &'a Path,
    platform: TargetPlatform,
}

impl<'a> ExtensionCompileSpec<'a> {
    pub fn new(section: &'a ExtensionSection, root: &'a Path, platform: TargetPlatform) -> Self {
        ExtensionCompileSpec {
            section,
            root,
            platform,
        }
    }

    /// Defaults handed to the flag resolver: manifest values plus platform
    /// arguments. `extra_includes` are the outputs of include commands.
    pub fn defaults(&self, extra_includes: &[PathBuf]) -> ResolvedFlagSet {
        let (platform_compile, platform_link) = platform_args(self.platform);
        let mut flags = ResolvedFlagSet::new();

        flags.extend(
            FlagCategory::IncludeDir,
            self.section
                .include_dirs
                .iter()
                .map(|d| absolutize(self.root, d))
                .chain(extra_includes.iter().cloned())
                .map(|d| d.display().to_string()),
        );
        flags.extend(
            FlagCategory::LibraryDir,
            self.section
                .library_dirs
                .iter()
                .map(|d| absolutize(self.root, d).display().to_string()),
        );
        flags.extend(FlagCategory::Library, self.section.libraries.iter().cloned());
        flags.extend(
            FlagCategory::ExtraCompileArg,
            self.section.extra_compile_args.iter().cloned().chain(platform_compile),
        );
        flags.extend(
            FlagCategory::ExtraLinkArg,
            self.section.extra_link_args.iter().cloned().chain(platform_link),
        );

        flags
    }

    /// Run each include command and collect the directories they print.
    pub fn query_include_dirs(&self, executor: &dyn Executor) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for command in &self.section.include_commands {
            let Some((program, args)) = command.split_first() else {
                continue;
            };
            let cmd = ProcessBuilder::new(program).args(args).cwd(self.root);
            let output = check_output(executor, &cmd).with_context(|| {
                format!("failed to query include directory for `{}`", self.section.name)
            })?;

            let dir = output.stdout.trim();
            if dir.is_empty() {
                tracing::warn!("`{}` printed no include directory", cmd.display_command());
            } else {
                dirs.push(PathBuf::from(dir));
            }
        }
        Ok(dirs)
    }

    /// Produce the mode-independent compile unit.
    pub fn resolve(
        &self,
        resolver: &FlagResolver<'_>,
        executor: &dyn Executor,
    ) -> Result<CompileUnit> {
        let extra_includes = self.query_include_dirs(executor)?;
        let flags = resolver.resolve(&self.section.packages, self.defaults(&extra_includes))?;
        Ok(self.unit_from_flags(flags))
    }

    fn unit_from_flags(&self, flags: ResolvedFlagSet) -> CompileUnit {
        let swig_opts = self
            .section
            .swig_opts
            .iter()
            .cloned()
            .chain(flags.include_dirs.iter().map(|d| format!("-I{}", d)))
            .collect();

        CompileUnit {
            name: self.section.name.clone(),
            sources: self
                .section
                .sources
                .iter()
                .map(|s| absolutize(self.root, s))
                .collect(),
            include_dirs: flags.include_dir_paths(),
            library_dirs: flags.library_dir_paths(),
            libraries: flags.libraries,
            extra_compile_args: flags.extra_compile_args,
            extra_link_args: flags.extra_link_args,
            swig_opts,
            language: self.section.language,
            suffix: self
                .section
                .suffix
                .clone()
                .unwrap_or_else(|| self.platform.extension_suffix().to_string()),
        }
    }
}
