//! Implementation of `easel build`, `build_ext` and `build_translations`.

use anyhow::Result;

use crate::builder::extension::{CompileUnit, ExtensionCompileSpec};
use crate::builder::flags::FlagResolver;
use crate::builder::native::BuildExtStage;
use crate::builder::packaging::{BuildPyStage, BuildScriptsStage};
use crate::builder::pipeline::{BuildPipeline, BuildReport};
use crate::builder::translations::BuildTranslationsStage;
use crate::builder::BuildContext;

/// Which stages a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageSelection {
    /// The full build.
    #[default]
    All,
    /// `build_ext` alone.
    Extension,
    /// `build_translations` alone.
    Translations,
    /// `build_scripts` alone, as run before installing scripts.
    Scripts,
}

/// Assemble the pipeline for a selection.
pub fn pipeline_for(selection: StageSelection) -> BuildPipeline {
    let mut pipeline = BuildPipeline::new();
    match selection {
        StageSelection::All => {
            pipeline
                .add(Box::new(BuildExtStage))
                .add(Box::new(BuildPyStage))
                .add(Box::new(BuildScriptsStage))
                .add(Box::new(BuildTranslationsStage));
        }
        StageSelection::Extension => {
            pipeline.add(Box::new(BuildExtStage));
        }
        StageSelection::Translations => {
            pipeline.add(Box::new(BuildTranslationsStage));
        }
        StageSelection::Scripts => {
            pipeline.add(Box::new(BuildScriptsStage));
        }
    }
    pipeline
}

/// Run the selected stages.
pub fn build(ctx: &BuildContext<'_>, selection: StageSelection) -> Result<BuildReport> {
    let pipeline = pipeline_for(selection);
    tracing::debug!(
        "building {} ({})",
        ctx.project.manifest.package.name,
        pipeline
            .stage_ids()
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let report = pipeline.run(ctx)?;

    if !ctx.dry_run() {
        let written = report.outputs().count();
        tracing::info!(
            "finished {} stage(s) for {}; {} file(s) written",
            report.stages.len(),
            ctx.project.manifest.package.name,
            written
        );
    }

    Ok(report)
}

/// The compile unit the extension stage would use, or `None` without an
/// `[extension]` table.
pub fn compile_unit(ctx: &BuildContext<'_>) -> Result<Option<CompileUnit>> {
    let Some(ref section) = ctx.project.manifest.extension else {
        return Ok(None);
    };

    let resolver = FlagResolver::new(&ctx.tools.pkg_config, ctx.executor);
    let spec = ExtensionCompileSpec::new(section, ctx.root(), ctx.platform());
    let unit = spec
        .resolve(&resolver, ctx.executor)?
        .with_mode(ctx.settings.debug);
    Ok(Some(unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::context::{BuildSettings, DataFile, Tools};
    use crate::builder::pipeline::StageId;
    use crate::core::manifest::Manifest;
    use crate::core::platform::TargetPlatform;
    use crate::core::project::Project;
    use crate::test_support::{touch, touch_output, MockExecutor, MockProcessOutput, ProjectFixture};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn project(tmp: &TempDir) -> Project {
        let root = ProjectFixture::painting_app().write_to(tmp.path()).unwrap();
        let manifest = Manifest::load(&root.join("Easel.toml")).unwrap();
        Project::from_parts(root.clone(), root.join("Easel.toml"), manifest, Default::default())
            .with_platform(TargetPlatform::Linux)
    }

    /// Stub toolchain whose swig writes the generated module next to the
    /// interface, like the real tool.
    fn full_stub() -> MockExecutor {
        let mut exec = MockExecutor::new();
        exec.expect_prefix("pkg-config --libs", MockProcessOutput::success("-lpng16"));
        exec.expect_prefix("pkg-config --cflags", MockProcessOutput::success(""));
        exec.on_call("swig", |cmd| {
            let args = cmd.get_args();
            if let Some(pos) = args.iter().position(|a| a == "-outdir") {
                touch(PathBuf::from(&args[pos + 1]).join("mypaintlib.py"));
            }
        });
        exec.on_call("c++ -shared", touch_output);
        exec.on_call("msgfmt", touch_output);
        exec.set_default(MockProcessOutput::success(""));
        exec
    }

    fn ctx<'a>(project: &'a Project, exec: &'a MockExecutor, dry_run: bool) -> BuildContext<'a> {
        let settings = BuildSettings {
            dry_run,
            ..BuildSettings::new(TargetPlatform::Linux)
        };
        BuildContext::new(project, settings, exec).with_tools(Tools::bare())
    }

    #[test]
    fn test_full_build_order() {
        let tmp = TempDir::new().unwrap();
        let project = project(&tmp);
        let exec = full_stub();

        let report = build(&ctx(&project, &exec, false), StageSelection::All).unwrap();

        assert_eq!(
            report.stage_ids(),
            vec![
                StageId::BuildExt,
                StageId::BuildPy,
                StageId::BuildScripts,
                StageId::BuildTranslations,
            ]
        );

        // The generated module only exists once the extension stage ran,
        // so build_py copying it proves the ordering.
        assert!(project.root.join("build/lib/lib/mypaintlib.py").is_file());
        assert!(project.root.join("build/lib/_mypaintlib.so").is_file());

        let calls = exec.calls();
        let link = calls.iter().position(|c| c.starts_with("c++ -shared")).unwrap();
        let first_msgfmt = calls.iter().position(|c| c.starts_with("msgfmt")).unwrap();
        assert!(link < first_msgfmt);
        assert_eq!(exec.calls_matching("msgfmt").len(), 2);

        assert_eq!(
            report.data_files,
            vec![
                DataFile {
                    install_dir: PathBuf::from("locale/de/LC_MESSAGES"),
                    files: vec![project.root.join("build/temp/locale/de/LC_MESSAGES/mypaint.mo")],
                },
                DataFile {
                    install_dir: PathBuf::from("locale/fr/LC_MESSAGES"),
                    files: vec![project.root.join("build/temp/locale/fr/LC_MESSAGES/mypaint.mo")],
                },
            ]
        );
    }

    #[test]
    fn test_selection_runs_single_stage() {
        let tmp = TempDir::new().unwrap();
        let project = project(&tmp);
        let exec = full_stub();

        let report = build(&ctx(&project, &exec, false), StageSelection::Translations).unwrap();

        assert_eq!(report.stage_ids(), vec![StageId::BuildTranslations]);
        assert!(exec.calls().iter().all(|c| c.starts_with("msgfmt")));
        assert!(!project.root.join("build/lib").exists());
    }

    #[test]
    fn test_dry_run_full_build_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let project = project(&tmp);
        let exec = full_stub();

        let report = build(&ctx(&project, &exec, true), StageSelection::All).unwrap();

        assert_eq!(report.stages.len(), 4);
        assert_eq!(report.outputs().count(), 0);
        assert!(report.data_files.is_empty());
        assert!(!project.root.join("build").exists());
        assert!(exec.calls().iter().all(|c| c.starts_with("pkg-config")));
    }

    #[test]
    fn test_compile_unit_reflects_mode() {
        let tmp = TempDir::new().unwrap();
        let project = project(&tmp);
        let exec = full_stub();
        let settings = BuildSettings {
            debug: true,
            ..BuildSettings::new(TargetPlatform::Linux)
        };
        let ctx = BuildContext::new(&project, settings, &exec)
            .with_tools(Tools::bare());

        let unit = compile_unit(&ctx).unwrap().unwrap();
        assert!(unit.extra_compile_args.contains(&"-DHEAVY_DEBUG".to_string()));
        assert_eq!(unit.libraries, vec!["png16"]);
    }
}
