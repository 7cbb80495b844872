//! Implementation of `easel install_scripts`.
//!
//! Every staged script is rewritten into the install directory with a
//! "do not edit" header carrying the version block. Scripts starting with
//! an interpreter directive keep it on the first line and become
//! executable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::packaging::DIRECTIVE_PREFIX;
use crate::builder::BuildContext;
use crate::core::error::BuildError;
use crate::core::platform::TargetPlatform;
use crate::core::version;
use crate::ops::easel_build::{build, StageSelection};
use crate::util::fs::{ensure_dir, list_files, make_executable, read_to_string, write_string};
use crate::util::hash::sha256_file;

/// Suffix removed from installed script names.
pub const SCRIPT_SUFFIX: &str = ".py";

/// Options for `install_scripts`.
#[derive(Debug, Clone, Default)]
pub struct InstallScriptsOptions {
    /// Destination; defaults to `[install] scripts-dir`.
    pub install_dir: Option<PathBuf>,
    /// Do not run `build_scripts` first.
    pub skip_build: bool,
    /// Write a JSON record of installed files here.
    pub record: Option<PathBuf>,
}

/// One installed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledScript {
    pub source: PathBuf,
    pub name: String,
    pub header: String,
    pub path: PathBuf,
}

/// The header placed below the directive (or above the first line).
pub fn render_header(source_name: &str, version_info: &str) -> String {
    format!(
        "\n#\n# ***DO NOT EDIT THIS FILE***: edit {} instead.\n#\n# Auto-generated version info follows.\n{}\n",
        source_name, version_info
    )
}

/// Installed file name for a staged script.
pub fn installed_name(file_name: &str, platform: TargetPlatform) -> String {
    if platform.strips_script_suffix() {
        if let Some(stem) = file_name.strip_suffix(SCRIPT_SUFFIX) {
            return stem.to_string();
        }
    }
    file_name.to_string()
}

/// Rewrite `contents` with `header` injected.
///
/// Returns the new text and whether the first line was an interpreter
/// directive. Every written line ends in `\n`.
pub fn inject_header(contents: &str, header: &str) -> (String, bool) {
    let mut lines = contents.lines();
    let first = lines.next().unwrap_or("");
    let has_directive = first.starts_with(DIRECTIVE_PREFIX);

    let mut out = String::with_capacity(contents.len() + header.len() + 2);
    if has_directive {
        out.push_str(first);
        out.push('\n');
        out.push_str(header);
        out.push('\n');
    } else {
        out.push_str(header);
        out.push('\n');
        out.push_str(first);
        out.push('\n');
    }
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }

    (out, has_directive)
}

/// Installs staged scripts into one directory.
#[derive(Debug, Clone)]
pub struct ScriptInstaller {
    install_dir: PathBuf,
    platform: TargetPlatform,
    version_info: String,
    dry_run: bool,
}

impl ScriptInstaller {
    pub fn new(
        install_dir: impl Into<PathBuf>,
        platform: TargetPlatform,
        version_info: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        ScriptInstaller {
            install_dir: install_dir.into(),
            platform,
            version_info: version_info.into(),
            dry_run,
        }
    }

    /// Install every file in `build_dir`, sorted by name.
    ///
    /// Stops at the first failure; scripts already installed stay.
    pub fn install_all(&self, build_dir: &Path) -> Result<Vec<InstalledScript>> {
        if !self.dry_run {
            ensure_dir(&self.install_dir)?;
        }

        let mut installed = Vec::new();
        for src in list_files(build_dir)? {
            if let Some(script) = self.install(&src)? {
                installed.push(script);
            }
        }
        Ok(installed)
    }

    /// Install one script; `None` in dry-run.
    pub fn install(&self, src: &Path) -> Result<Option<InstalledScript>> {
        let source_name = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("not a file: {}", src.display()))?;
        let name = installed_name(&source_name, self.platform);
        let path = self.install_dir.join(&name);

        tracing::info!("installing {} as {}", src.display(), name);
        if self.dry_run {
            return Ok(None);
        }

        let header = render_header(&source_name, &self.version_info);
        let (text, has_directive) = inject_header(&read_to_string(src)?, &header);
        write_string(&path, &text)?;

        if has_directive {
            make_executable(&path)?;
        }

        Ok(Some(InstalledScript {
            source: src.to_path_buf(),
            name,
            header,
            path,
        }))
    }
}

#[derive(Debug, Serialize)]
struct RecordEntry {
    path: PathBuf,
    sha256: String,
}

#[derive(Debug, Serialize)]
struct Record {
    files: Vec<RecordEntry>,
}

/// Write a JSON list of installed paths with their digests.
pub fn write_record(path: &Path, installed: &[InstalledScript]) -> Result<()> {
    let files = installed
        .iter()
        .map(|script| {
            Ok(RecordEntry {
                path: script.path.clone(),
                sha256: sha256_file(&script.path)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let json = serde_json::to_string_pretty(&Record { files })
        .context("failed to serialize install record")?;
    write_string(path, &(json + "\n"))
}

/// Run `install_scripts` for a project.
pub fn install_scripts(
    ctx: &BuildContext<'_>,
    opts: &InstallScriptsOptions,
) -> Result<Vec<InstalledScript>> {
    let install_dir = opts
        .install_dir
        .clone()
        .or_else(|| ctx.project.manifest.install.scripts_dir.clone())
        .map(|dir| ctx.project.path(&dir))
        .ok_or_else(|| BuildError::Configuration {
            message: "no install directory: pass --install-dir or set `install.scripts-dir`"
                .to_string(),
        })?;

    if !opts.skip_build {
        build(ctx, StageSelection::Scripts)?;
    }

    let version_info = version::for_project(ctx.project, ctx.executor).release_info_script()?;
    let installer = ScriptInstaller::new(&install_dir, ctx.platform(), version_info, ctx.dry_run());
    let installed = installer.install_all(&ctx.layout.scripts)?;

    if let Some(ref record) = opts.record {
        if ctx.dry_run() {
            tracing::info!("would write install record to {}", record.display());
        } else {
            write_record(record, &installed)?;
        }
    }

    Ok(installed)
}
