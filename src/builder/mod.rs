//! Build stages and the pipeline that orders them.
//!
//! This module implements flag resolution, the native extension driver,
//! catalog compilation and pure-source packaging.

pub mod context;
pub mod extension;
pub mod flags;
pub mod native;
pub mod packaging;
pub mod pipeline;
pub mod toolchain;
pub mod translations;

pub use context::{BuildContext, BuildLayout, BuildSettings, DataFile, Tools};
pub use extension::{CompileUnit, ExtensionCompileSpec};
pub use flags::{FlagCategory, FlagResolver, ResolvedFlagSet};
pub use native::{BuildExtStage, ExtensionBuilder, ExtensionOutcome};
pub use packaging::{BuildPyStage, BuildScriptsStage};
pub use pipeline::{BuildPipeline, BuildReport, Stage, StageId, StageOutput, StageReport};
pub use toolchain::Toolchain;
pub use translations::{BuildTranslationsStage, TranslationCatalog, TranslationCompiler};
