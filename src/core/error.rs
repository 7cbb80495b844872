//! Build error taxonomy and diagnostics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// A fatal build failure.
///
/// Library functions return `anyhow::Result` with one of these as the root
/// cause; use `downcast_ref::<BuildError>()` to classify a failure.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A required tool is missing, a dependency cannot be resolved, or the
    /// project configuration is invalid.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// An external process exited unsuccessfully.
    #[error("`{command}` failed with exit code {}", display_code(.code))]
    ToolInvocation {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A tool reported success but its output is missing.
    #[error("internal consistency error: {message} ({})", .path.display())]
    Consistency { path: PathBuf, message: String },

    /// A filesystem operation failed.
    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

impl BuildError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::Configuration { message } => Diagnostic::error(message.clone())
                .with_suggestion(suggestions::CHECK_TOOLS)
                .with_suggestion(suggestions::CHECK_PKG_CONFIG_PATH),

            BuildError::ToolInvocation {
                command, stderr, ..
            } => {
                let mut diag = Diagnostic::error(self.to_string())
                    .with_context(format!("command: {}", command));
                for line in stderr.lines().filter(|l| !l.trim().is_empty()).take(20) {
                    diag = diag.with_context(line.to_string());
                }
                diag.with_suggestion(suggestions::BUILD_FAILED)
            }

            BuildError::Consistency { path, .. } => Diagnostic::error(self.to_string())
                .with_location(path.clone())
                .with_suggestion(suggestions::REPORT_BUG),

            BuildError::Io { path, source, .. } => Diagnostic::error(self.to_string())
                .with_location(path.clone())
                .with_context(source.to_string()),
        }
    }
}
