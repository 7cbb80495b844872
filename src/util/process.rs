//! Subprocess execution utilities.
//!
//! Every external tool (pkg-config, msgfmt, swig, the C++ driver, the
//! launched application) goes through an [`Executor`], so stages can be
//! exercised against a recording mock instead of the real toolchain.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Result;
use thiserror::Error;

use crate::core::error::BuildError;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get an environment override, if one was set.
    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Display the command for messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Result of running a process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Failure to start a process at all.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("`{program}` was not found")]
    NotFound { program: String },

    #[error("failed to run `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    fn from_io(program: &Path, err: io::Error) -> Self {
        let program = program.display().to_string();
        if err.kind() == io::ErrorKind::NotFound {
            ProcessError::NotFound { program }
        } else {
            ProcessError::Spawn {
                program,
                source: err,
            }
        }
    }
}

/// Runs external commands.
pub trait Executor {
    /// Run to completion, capturing stdout and stderr.
    fn output(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError>;

    /// Run to completion with inherited stdio. Captured streams are empty.
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError>;
}

/// Executor backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn output(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!("exec: {}", cmd.display_command());

        let output = cmd
            .build_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ProcessError::from_io(cmd.get_program(), e))?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!("exec (inherit): {}", cmd.display_command());

        let status = cmd
            .build_command()
            .status()
            .map_err(|e| ProcessError::from_io(cmd.get_program(), e))?;

        Ok(ProcessOutput {
            status: status.code(),
            ..ProcessOutput::default()
        })
    }
}

fn invocation_failed(cmd: &ProcessBuilder, output: ProcessOutput) -> anyhow::Error {
    BuildError::ToolInvocation {
        command: cmd.display_command(),
        code: output.status,
        stderr: output.stderr.trim_end().to_string(),
    }
    .into()
}

fn spawn_failed(cmd: &ProcessBuilder, err: ProcessError) -> anyhow::Error {
    let message = match err {
        ProcessError::NotFound { program } => {
            format!("required tool `{}` was not found", program)
        }
        ProcessError::Spawn { source, .. } => {
            format!("could not start `{}`: {}", cmd.display_command(), source)
        }
    };
    BuildError::Configuration { message }.into()
}

/// Run a command, capturing output, and require a zero exit status.
pub fn check_output(exec: &dyn Executor, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
    let output = exec.output(cmd).map_err(|e| spawn_failed(cmd, e))?;
    if !output.success() {
        return Err(invocation_failed(cmd, output));
    }
    Ok(output)
}

/// Run a command with inherited stdio and require a zero exit status.
pub fn check_call(exec: &dyn Executor, cmd: &ProcessBuilder) -> Result<()> {
    let output = exec.run(cmd).map_err(|e| spawn_failed(cmd, e))?;
    if !output.success() {
        return Err(invocation_failed(cmd, output));
    }
    Ok(())
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Resolve a tool from an explicit setting, an environment variable, or a
/// list of candidate names on `PATH`.
///
/// Falls back to the first candidate's bare name so a missing tool surfaces
/// as a "not found" error when it is actually invoked.
pub fn locate_tool(configured: Option<&Path>, env_var: &str, candidates: &[&str]) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }

    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return find_executable(value.trim()).unwrap_or_else(|| PathBuf::from(value.trim()));
        }
    }

    for candidate in candidates {
        if let Some(path) = find_executable(candidate) {
            return path;
        }
    }

    PathBuf::from(candidates.first().copied().unwrap_or_default())
}
