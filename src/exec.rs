//! External command execution behind the [`Executor`] trait.
use std::process::{Command, Output, Stdio};

use crate::error::CommandError;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process spawning so scripts can be tested without
/// touching the host.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command with captured output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] if the program cannot start and
    /// [`CommandError::Failed`] on a non-zero exit.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult, CommandError>;

    /// Run a command with captured output, returning the result regardless of
    /// exit status.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] if the program cannot start.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult, CommandError>;

    /// Run a command attached to the terminal (inherited stdin/stdout/stderr),
    /// so package managers and editors can talk to the user directly.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] if the program cannot start and
    /// [`CommandError::Failed`] on a non-zero exit.
    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<(), CommandError>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult, CommandError> {
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            return Err(CommandError::Failed {
                program: command_line(program, args),
                code: result.code.unwrap_or(-1),
                stderr: result.stderr,
            });
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult, CommandError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn {
                program: command_line(program, args),
                source,
            })?;
        Ok(ExecResult::from(output))
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| CommandError::Spawn {
                program: command_line(program, args),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                program: command_line(program, args),
                code: status.code().unwrap_or(-1),
                stderr: String::new(),
            })
        }
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Render `program args…` for log and error messages.
#[must_use]
pub fn command_line(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}
