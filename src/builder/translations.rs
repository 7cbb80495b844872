//! Incremental message-catalog compilation.
//!
//! Every `<lang>.po` in the translation source directory compiles to
//! `<build_temp>/locale/<lang>/LC_MESSAGES/<domain>.mo` with msgfmt, and is
//! registered for installation under `locale/<lang>/LC_MESSAGES`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::{BuildContext, DataFile};
use crate::builder::pipeline::{Stage, StageId, StageOutput};
use crate::core::error::BuildError;
use crate::util::fs::{ensure_dir, is_stale, list_files};
use crate::util::process::{check_call, Executor, ProcessBuilder};

/// Extension of translation sources.
pub const SOURCE_EXTENSION: &str = "po";

/// One language's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationCatalog {
    /// Language code: the source file name without `.po`.
    pub language: String,
    pub source: PathBuf,
    pub target: PathBuf,
    /// Install directory relative to the data prefix.
    pub install_dir: PathBuf,
}

impl TranslationCatalog {
    /// Catalog for `source`, or `None` if it is not a `.po` file.
    pub fn new(source: &Path, build_temp: &Path, domain: &str) -> Option<Self> {
        if source.extension()? != SOURCE_EXTENSION {
            return None;
        }
        let language = source.file_stem()?.to_string_lossy().into_owned();
        let install_dir = Path::new("locale").join(&language).join("LC_MESSAGES");
        let target = build_temp.join(&install_dir).join(format!("{}.mo", domain));

        Some(TranslationCatalog {
            language,
            source: source.to_path_buf(),
            target,
            install_dir,
        })
    }

    /// Whether msgfmt needs to run.
    pub fn is_stale(&self) -> Result<bool> {
        is_stale(&self.target, &[&self.source])
    }
}

/// All catalogs in `source_dir`, sorted by language.
pub fn discover_catalogs(
    source_dir: &Path,
    build_temp: &Path,
    domain: &str,
) -> Result<Vec<TranslationCatalog>> {
    Ok(list_files(source_dir)?
        .iter()
        .filter_map(|path| TranslationCatalog::new(path, build_temp, domain))
        .collect())
}

/// Runs msgfmt over stale catalogs.
pub struct TranslationCompiler<'a> {
    msgfmt: PathBuf,
    executor: &'a dyn Executor,
    dry_run: bool,
}

impl<'a> TranslationCompiler<'a> {
    pub fn new(msgfmt: impl Into<PathBuf>, executor: &'a dyn Executor, dry_run: bool) -> Self {
        TranslationCompiler {
            msgfmt: msgfmt.into(),
            executor,
            dry_run,
        }
    }

    fn command(&self, catalog: &TranslationCatalog) -> ProcessBuilder {
        ProcessBuilder::new(&self.msgfmt)
            .arg(&catalog.source)
            .arg("-o")
            .arg(&catalog.target)
    }

    /// Bring one catalog up to date.
    ///
    /// Returns the data file to install, or `None` in dry-run.
    pub fn compile(&self, catalog: &TranslationCatalog) -> Result<Option<DataFile>> {
        if catalog.is_stale()? {
            let cmd = self.command(catalog);
            if self.dry_run {
                tracing::info!("would run {}", cmd.display_command());
                return Ok(None);
            }

            tracing::info!("running {}", cmd.display_command());
            if let Some(dir) = catalog.target.parent() {
                ensure_dir(dir)?;
            }
            check_call(self.executor, &cmd)?;
        } else {
            tracing::debug!("{} is up to date", catalog.target.display());
        }

        if !catalog.target.exists() {
            return Err(BuildError::Consistency {
                path: catalog.target.clone(),
                message: format!("msgfmt did not produce a catalog for `{}`", catalog.language),
            }
            .into());
        }

        if self.dry_run {
            return Ok(None);
        }

        Ok(Some(DataFile {
            install_dir: catalog.install_dir.clone(),
            files: vec![catalog.target.clone()],
        }))
    }

    /// Bring every catalog up to date, in order.
    pub fn compile_all(&self, catalogs: &[TranslationCatalog]) -> Result<Vec<DataFile>> {
        let mut data_files = Vec::new();
        for catalog in catalogs {
            data_files.extend(self.compile(catalog)?);
        }
        Ok(data_files)
    }
}

/// The `build_translations` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildTranslationsStage;

impl Stage for BuildTranslationsStage {
    fn id(&self) -> StageId {
        StageId::BuildTranslations
    }

    fn run(&self, ctx: &BuildContext<'_>) -> Result<StageOutput> {
        let Some(ref section) = ctx.project.manifest.translations else {
            tracing::debug!("no [translations] table; nothing to compile");
            return Ok(StageOutput::default());
        };

        let source_dir = ctx.project.path(&section.source_dir);
        let catalogs = discover_catalogs(&source_dir, &ctx.layout.temp, &section.domain)?;
        if catalogs.is_empty() {
            tracing::warn!("no translation sources found in {}", source_dir.display());
        }

        let mut rebuilt = Vec::new();
        for catalog in &catalogs {
            if catalog.is_stale()? && !ctx.dry_run() {
                rebuilt.push(catalog.target.clone());
            }
        }

        let compiler = TranslationCompiler::new(&ctx.tools.msgfmt, ctx.executor, ctx.dry_run());
        let data_files = compiler.compile_all(&catalogs)?;

        Ok(StageOutput {
            outputs: rebuilt,
            data_files,
        })
    }
}
