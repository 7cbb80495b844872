//! Core data structures for easel.
//!
//! This module contains the foundational types used throughout easel:
//! - The `Easel.toml` manifest schema
//! - The target platform tag and its policies
//! - The build error taxonomy
//! - Version-info producers for installed scripts

pub mod error;
pub mod manifest;
pub mod platform;
pub mod project;
pub mod version;

pub use error::BuildError;
pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use platform::TargetPlatform;
pub use project::Project;
pub use version::VersionInfo;
