//! easel - build orchestration for an application with a native extension
//!
//! This crate provides the library behind the `easel` binary: pkg-config
//! flag resolution, the extension compile driver, message-catalog
//! compilation, pure-source packaging and script installation, all run
//! through a fixed-order build pipeline.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for easel unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording process executor and project
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{manifest::Manifest, platform::TargetPlatform, project::Project};
pub use util::context::GlobalContext;
