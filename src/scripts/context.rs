use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{self, Config};
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::prompt::Prompter;

/// Shared context for script execution.
#[derive(Debug)]
pub struct Context {
    /// Tool configuration.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and script recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Source of answers to interactive questions.
    pub prompter: Arc<dyn Prompter>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Where patched files are backed up first; `None` disables backups.
    pub backup_dir: Option<PathBuf>,
}

impl Context {
    /// Creates a new context for script execution.
    ///
    /// When `backup` is set, files are backed up to `<cache dir>/backups`
    /// before they are patched.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        prompter: Arc<dyn Prompter>,
        dry_run: bool,
        backup: bool,
    ) -> Self {
        Self {
            config,
            platform,
            log,
            executor,
            prompter,
            dry_run,
            backup_dir: backup.then(|| config::cache_dir().join("backups")),
        }
    }

    /// Create a copy of this context with a different logger.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            platform: Arc::clone(&self.platform),
            log,
            executor: Arc::clone(&self.executor),
            prompter: Arc::clone(&self.prompter),
            dry_run: self.dry_run,
            backup_dir: self.backup_dir.clone(),
        }
    }
}
