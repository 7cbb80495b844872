//! Native extension driver.
//!
//! Runs the wrapper generator over interface files, compiles every source
//! and links the objects into the extension module.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::builder::extension::{CompileUnit, ExtensionCompileSpec};
use crate::builder::flags::FlagResolver;
use crate::builder::pipeline::{Stage, StageId, StageOutput};
use crate::builder::toolchain::{is_interface, Toolchain};
use crate::core::error::BuildError;
use crate::util::fs::{ensure_dir, is_stale, read_to_string, write_string};
use crate::util::hash::Fingerprint;
use crate::util::process::{check_call, ProcessBuilder};

/// What happened to the extension module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionOutcome {
    Built(PathBuf),
    UpToDate(PathBuf),
    /// Commands were announced but not run.
    DryRun(PathBuf),
}

/// Extension module builder.
pub struct ExtensionBuilder<'a> {
    ctx: &'a BuildContext<'a>,
    toolchain: Toolchain,
}

impl<'a> ExtensionBuilder<'a> {
    pub fn new(ctx: &'a BuildContext<'a>) -> Self {
        let toolchain = Toolchain::new(&ctx.tools.cxx, &ctx.tools.swig, ctx.platform());
        ExtensionBuilder { ctx, toolchain }
    }

    /// Output path of the module.
    pub fn module_path(&self, unit: &CompileUnit) -> PathBuf {
        self.ctx.layout.lib.join(unit.module_path())
    }

    fn fingerprint_path(&self, unit: &CompileUnit) -> PathBuf {
        self.ctx.layout.temp.join(format!("{}.flags", unit.name))
    }

    /// Hash of everything on the command lines, so a mode switch rebuilds.
    fn fingerprint(&self, unit: &CompileUnit) -> String {
        let flags = unit.flag_set();
        let mut fp = Fingerprint::new();
        fp.field("cxx", [self.toolchain.cxx().display().to_string()])
            .field("sources", unit.sources.iter().map(|s| s.display().to_string()))
            .field("include-dirs", &flags.include_dirs)
            .field("library-dirs", &flags.library_dirs)
            .field("libraries", &flags.libraries)
            .field("compile", &flags.extra_compile_args)
            .field("link", &flags.extra_link_args)
            .field("swig", &unit.swig_opts);
        fp.finish()
    }

    fn is_up_to_date(&self, unit: &CompileUnit, module: &Path) -> Result<bool> {
        if is_stale(module, &unit.sources)? {
            return Ok(false);
        }
        let path = self.fingerprint_path(unit);
        if !path.exists() {
            return Ok(false);
        }
        Ok(read_to_string(&path)?.trim() == self.fingerprint(unit))
    }

    /// Build the module unless it is up to date.
    pub fn build(&self, unit: &CompileUnit, force: bool) -> Result<ExtensionOutcome> {
        let module = self.module_path(unit);

        if !force && self.is_up_to_date(unit, &module)? {
            tracing::debug!("skipping `{}` extension (up-to-date)", unit.name);
            return Ok(ExtensionOutcome::UpToDate(module));
        }

        tracing::info!("building `{}` extension", unit.name);
        let dry_run = self.ctx.dry_run();
        let temp = &self.ctx.layout.temp;

        let mut compile_sources = Vec::with_capacity(unit.sources.len());
        for source in &unit.sources {
            if is_interface(source) {
                let wrapper = self.toolchain.wrapper_path(unit, source, temp);
                tracing::info!("swigging {} to {}", source.display(), wrapper.display());
                let cmd = self.toolchain.swig_command(unit, source, &wrapper);
                self.execute(&cmd, &[temp.as_path()])?;
                compile_sources.push(wrapper);
            } else {
                compile_sources.push(source.clone());
            }
        }

        let mut objects = Vec::with_capacity(compile_sources.len());
        for source in &compile_sources {
            let object = self.toolchain.object_path(source, self.ctx.root(), temp);
            tracing::info!("compiling {}", source.display());
            let cmd = self.toolchain.compile_command(unit, source, &object);
            self.execute(&cmd, &[parent_of(&object)])?;
            objects.push(object);
        }

        tracing::info!("linking {}", module.display());
        let cmd = self.toolchain.link_command(unit, &objects, &module);
        self.execute(&cmd, &[parent_of(&module)])?;

        if dry_run {
            return Ok(ExtensionOutcome::DryRun(module));
        }

        if !module.exists() {
            return Err(BuildError::Consistency {
                path: module,
                message: "linker reported success but the module is missing".to_string(),
            }
            .into());
        }

        write_string(&self.fingerprint_path(unit), &self.fingerprint(unit))?;
        Ok(ExtensionOutcome::Built(module))
    }

    /// Announce `cmd`; unless dry-run, create `dirs` and run it.
    fn execute(&self, cmd: &ProcessBuilder, dirs: &[&Path]) -> Result<()> {
        if self.ctx.dry_run() {
            tracing::info!("would run {}", cmd.display_command());
            return Ok(());
        }
        for dir in dirs {
            ensure_dir(dir)?;
        }
        tracing::debug!("running {}", cmd.display_command());
        check_call(self.ctx.executor, cmd)
    }
}

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// The `build_ext` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildExtStage;

impl Stage for BuildExtStage {
    fn id(&self) -> StageId {
        StageId::BuildExt
    }

    fn run(&self, ctx: &BuildContext<'_>) -> Result<StageOutput> {
        let Some(ref section) = ctx.project.manifest.extension else {
            tracing::debug!("no [extension] table; nothing to build");
            return Ok(StageOutput::default());
        };

        let resolver = FlagResolver::new(&ctx.tools.pkg_config, ctx.executor);
        let spec = ExtensionCompileSpec::new(section, ctx.root(), ctx.platform());
        let unit = spec
            .resolve(&resolver, ctx.executor)?
            .with_mode(ctx.settings.debug);

        let outcome = ExtensionBuilder::new(ctx).build(&unit, ctx.settings.force)?;
        let outputs = match outcome {
            ExtensionOutcome::Built(module) => vec![module],
            ExtensionOutcome::UpToDate(_) | ExtensionOutcome::DryRun(_) => Vec::new(),
        };

        Ok(StageOutput {
            outputs,
            data_files: Vec::new(),
        })
    }
}
