//! Domain-specific error types for the hardening engine.
//!
//! Internal modules return typed errors (e.g., [`PatchError`],
//! [`DispatchError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! HardenError
//! ├── Patch(PatchError)       : configuration file unreadable or unwritable
//! ├── Dispatch(DispatchError) : script refused for this OS, or script failed
//! └── Command(CommandError)   : external program could not start or exited non-zero
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::Os;

/// Top-level error type for the hardening engine.
#[derive(Error, Debug)]
pub enum HardenError {
    /// Directive patching error.
    #[error("Patch error: {0}")]
    Patch(#[from] PatchError),

    /// Script dispatch error.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// External command error.
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Errors raised while reading or rewriting a configuration file.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The file could not be read, written, or replaced.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// Path of the file being patched.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl PatchError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by [`ScriptRegistry::dispatch`](crate::scripts::ScriptRegistry::dispatch).
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The script does not declare support for the requested OS.
    #[error("script '{script}' is not supported on {os}")]
    UnsupportedOnOs {
        /// Name of the script.
        script: String,
        /// Operating system it was dispatched against.
        os: Os,
    },

    /// The script ran and returned an error.
    #[error("script '{script}' failed: {source}")]
    Failed {
        /// Name of the script.
        script: String,
        /// Error returned by the script's entry point.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors raised when running an external program.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The program exited with a non-zero status.
    #[error("'{program}' failed (exit {code}){}", stderr_suffix(.stderr))]
    Failed {
        /// Command line that was run.
        program: String,
        /// Exit code, or `-1` when terminated by a signal.
        code: i32,
        /// Captured standard error (empty for inherited-stdio runs).
        stderr: String,
    },

    /// The program could not be started at all.
    #[error("failed to execute '{program}': {source}")]
    Spawn {
        /// Command line that was run.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
