//! The fixed-order build pipeline.
//!
//! Stages are registered in any order and always run as
//! `build_ext < build_py < build_scripts < build_translations`: the
//! extension build generates the wrapper module that `build_py` copies.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::context::{BuildContext, DataFile};

/// Identity of a stage; the derived order is the execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageId {
    BuildExt,
    BuildPy,
    BuildScripts,
    BuildTranslations,
}

impl StageId {
    pub fn as_str(self) -> &'static str {
        match self {
            StageId::BuildExt => "build_ext",
            StageId::BuildPy => "build_py",
            StageId::BuildScripts => "build_scripts",
            StageId::BuildTranslations => "build_translations",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a stage produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutput {
    /// Files written (empty in dry-run or when everything was up to date).
    pub outputs: Vec<PathBuf>,
    /// Files registered for installation under the data prefix.
    pub data_files: Vec<DataFile>,
}

/// One step of the build.
pub trait Stage {
    fn id(&self) -> StageId;

    fn run(&self, ctx: &BuildContext<'_>) -> Result<StageOutput>;
}

/// Record of one executed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub id: StageId,
    pub outputs: Vec<PathBuf>,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Stages in the order they ran.
    pub stages: Vec<StageReport>,
    pub data_files: Vec<DataFile>,
}

impl BuildReport {
    /// Ids of the stages that ran.
    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.id).collect()
    }

    /// Every file written by any stage.
    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.stages.iter().flat_map(|s| s.outputs.iter())
    }
}

/// Sequential composition of stages.
#[derive(Default)]
pub struct BuildPipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl BuildPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stage, keeping the list sorted by [`StageId`].
    pub fn add(&mut self, stage: Box<dyn Stage>) -> &mut Self {
        let pos = self.stages.partition_point(|s| s.id() <= stage.id());
        self.stages.insert(pos, stage);
        self
    }

    pub fn with(mut self, stage: Box<dyn Stage>) -> Self {
        self.add(stage);
        self
    }

    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order, stopping at the first failure.
    pub fn run(&self, ctx: &BuildContext<'_>) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        for stage in &self.stages {
            let id = stage.id();
            let span = tracing::info_span!("stage", name = id.as_str());
            let _guard = span.enter();

            tracing::debug!("starting {}", id);
            let output = stage
                .run(ctx)
                .with_context(|| format!("stage `{}` failed", id))?;
            tracing::debug!("finished {} ({} file(s) written)", id, output.outputs.len());

            report.data_files.extend(output.data_files);
            report.stages.push(StageReport {
                id,
                outputs: output.outputs,
            });
        }

        Ok(report)
    }
}
