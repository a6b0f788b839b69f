//! Core logging types: script entries, status, and the [`Log`] trait.

/// Script dispatch result for summary reporting.
#[derive(Debug, Clone)]
pub struct ScriptEntry {
    /// Registered script name.
    pub name: String,
    /// Final status of the dispatch.
    pub status: ScriptStatus,
    /// Optional detail message (e.g., refusal reason or error description).
    pub message: Option<String>,
}

/// Status of a dispatched script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    /// Script ran to completion.
    Succeeded,
    /// Script returned an error.
    Failed,
    /// Dispatch was refused because the script does not support the host OS.
    Unsupported,
    /// Script ran in dry-run mode; no changes were applied.
    DryRun,
}

impl ScriptStatus {
    /// Label carried by summary events and written to the log file.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Unsupported => "unsupported",
            Self::DryRun => "dry-run",
        }
    }

    /// Parse a [`label`](Self::label) back into a status.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Succeeded, Self::Failed, Self::Unsupported, Self::DryRun]
            .into_iter()
            .find(|status| status.label() == label)
    }
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) implements this trait; scripts log
/// through `&dyn Log` so tests can substitute their own sink.
pub trait Log: Send + Sync + std::fmt::Debug {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a script result for the summary.
    fn record_script(&self, name: &str, status: ScriptStatus, message: Option<&str>);
}
