//! User-friendly diagnostic messages.
//!
//! Every fatal error names the offending command or path and, where there is
//! one, a concrete next step.

use std::fmt;
use std::path::PathBuf;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when a required tool is missing.
    pub const CHECK_TOOLS: &str =
        "Install the missing tool or point `[tools]` in .easel/config.toml at it";

    /// Suggestion when pkg-config cannot resolve a dependency.
    pub const CHECK_PKG_CONFIG_PATH: &str =
        "Make sure the library's development package is installed and PKG_CONFIG_PATH is set";

    /// Suggestion when a build step fails.
    pub const BUILD_FAILED: &str = "Run with --verbose to see every command as it runs";

    /// Suggestion for internal consistency failures.
    pub const REPORT_BUG: &str =
        "This indicates a tool reported success without producing output; please report it";
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let label = if color {
            "\x1b[1;31merror\x1b[0m"
        } else {
            "error"
        };
        output.push_str(&format!("{}: {}\n", label, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  | {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Manifest syntax or schema error, with the offending span.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("failed to parse {file}")]
#[diagnostic(
    code(easel::manifest::parse),
    help("Check the keys and value types against the documented Easel.toml layout")
)]
pub struct ManifestParseError {
    pub file: String,
    pub reason: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl ManifestParseError {
    /// Build from a TOML deserialization error.
    pub fn from_toml(file: impl Into<String>, contents: &str, err: &toml::de::Error) -> Self {
        let file = file.into();
        ManifestParseError {
            reason: err.message().to_string(),
            src: NamedSource::new(file.clone(), contents.to_string()),
            span: err.span().map(SourceSpan::from),
            file,
        }
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
