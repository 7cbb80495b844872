//! Test utilities and mocks for easel unit tests.
//!
//! The central piece is [`MockExecutor`], an [`Executor`] that records every
//! command line it is asked to run and answers from canned outputs, so
//! stages can be tested without pkg-config, msgfmt or a compiler installed.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut exec = MockExecutor::new();
//! exec.expect_prefix("pkg-config --libs", MockProcessOutput::success("-lpng16"));
//! exec.on_call("msgfmt", |cmd| touch(&cmd.get_args()[2]));
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::path::Path;

use crate::util::process::{Executor, ProcessBuilder, ProcessError, ProcessOutput};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn to_output(&self) -> ProcessOutput {
        ProcessOutput {
            status: Some(self.status),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
        }
    }
}

/// Expectation for a command execution.
#[derive(Debug, Clone)]
pub struct CommandExpectation {
    pub pattern: CommandPattern,
    pub output: MockProcessOutput,
}

type Hook = Box<dyn Fn(&ProcessBuilder)>;

/// Mock process executor for testing command execution.
///
/// Commands are matched against expectations in insertion order; the first
/// match wins. Hooks run before the output is returned and are used to
/// simulate a tool's side effects (e.g. msgfmt writing its target).
#[derive(Default)]
pub struct MockExecutor {
    expectations: Vec<CommandExpectation>,
    missing: Vec<String>,
    hooks: Vec<(CommandPattern, Hook)>,
    default_output: Option<MockProcessOutput>,
    calls: RefCell<Vec<String>>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock executor where every command succeeds silently.
    pub fn permissive() -> Self {
        let mut exec = Self::new();
        exec.set_default(MockProcessOutput::success(""));
        exec
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&mut self, cmd: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation {
            pattern: CommandPattern::Exact(cmd.to_string()),
            output,
        });
        self
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&mut self, prefix: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(CommandExpectation {
            pattern: CommandPattern::StartsWith(prefix.to_string()),
            output,
        });
        self
    }

    /// Report commands whose program starts with `program` as not installed.
    pub fn expect_missing(&mut self, program: &str) -> &mut Self {
        self.missing.push(program.to_string());
        self
    }

    /// Run `hook` for every command starting with `prefix`.
    pub fn on_call(&mut self, prefix: &str, hook: impl Fn(&ProcessBuilder) + 'static) -> &mut Self {
        self.hooks
            .push((CommandPattern::StartsWith(prefix.to_string()), Box::new(hook)));
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    /// Get all commands that were called, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Commands whose line starts with `prefix`.
    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Clear all recorded calls.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn dispatch(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        let line = cmd.display_command();
        self.calls.borrow_mut().push(line.clone());

        if self.missing.iter().any(|m| line.starts_with(m.as_str())) {
            return Err(ProcessError::NotFound {
                program: cmd.get_program().display().to_string(),
            });
        }

        for (pattern, hook) in &self.hooks {
            if pattern.matches(&line) {
                hook(cmd);
            }
        }

        if let Some(exp) = self.expectations.iter().find(|e| e.pattern.matches(&line)) {
            return Ok(exp.output.to_output());
        }

        match self.default_output {
            Some(ref default) => Ok(default.to_output()),
            None => panic!("unexpected command: {}", line),
        }
    }
}

impl Executor for MockExecutor {
    fn output(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        self.dispatch(cmd)
    }

    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        let mut output = self.dispatch(cmd)?;
        output.stdout.clear();
        output.stderr.clear();
        Ok(output)
    }
}

/// Create an empty file (and its parents), as a tool under test would.
pub fn touch(path: impl AsRef<Path>) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

/// Touch the path following `-o` in `cmd`, standing in for a compiler,
/// linker or msgfmt writing its output.
pub fn touch_output(cmd: &ProcessBuilder) {
    let args = cmd.get_args();
    if let Some(pos) = args.iter().position(|a| a == "-o") {
        if let Some(out) = args.get(pos + 1) {
            touch(out);
        }
    }
}

/// Set a file's modification time relative to now.
pub fn set_age(path: impl AsRef<Path>, seconds_ago: u64) {
    let time = std::time::SystemTime::now() - std::time::Duration::from_secs(seconds_ago);
    let file = std::fs::OpenOptions::new()
        .write(true)
        .open(path.as_ref())
        .unwrap();
    file.set_modified(time).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_records_and_matches() {
        let mut exec = MockExecutor::new();
        exec.expect("msgfmt --version", MockProcessOutput::success("msgfmt 0.21"));
        exec.expect_prefix("pkg-config", MockProcessOutput::failure(1, "nope"));

        let out = exec
            .output(&ProcessBuilder::new("msgfmt").arg("--version"))
            .unwrap();
        assert_eq!(out.stdout, "msgfmt 0.21");

        let out = exec
            .output(&ProcessBuilder::new("pkg-config").arg("--libs"))
            .unwrap();
        assert!(!out.success());

        assert_eq!(exec.calls(), vec!["msgfmt --version", "pkg-config --libs"]);
    }

    #[test]
    fn test_mock_executor_missing_program() {
        let mut exec = MockExecutor::permissive();
        exec.expect_missing("swig");

        let err = exec
            .output(&ProcessBuilder::new("swig").arg("-python"))
            .unwrap_err();
        assert!(matches!(err, ProcessError::NotFound { .. }));
    }

    #[test]
    fn test_mock_executor_hooks_run() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("out/de.mo");

        let mut exec = MockExecutor::permissive();
        exec.on_call("msgfmt", |cmd| touch(&cmd.get_args()[2]));

        exec.run(&ProcessBuilder::new("msgfmt").args([
            "de.po".to_string(),
            "-o".to_string(),
            target.display().to_string(),
        ]))
        .unwrap();

        assert!(target.exists());
    }
}
