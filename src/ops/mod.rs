//! High-level operations.
//!
//! This module contains the implementation of easel commands.

pub mod easel_build;
pub mod install_scripts;
pub mod run_build;

pub use easel_build::{build, compile_unit, pipeline_for, StageSelection};
pub use install_scripts::{install_scripts, InstallScriptsOptions, InstalledScript, ScriptInstaller};
pub use run_build::{run_build, RunHarness};
