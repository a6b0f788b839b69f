//! The [`Logger`] handed to commands and scripts.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, RULE_TARGET, STAGE_TARGET, STATUS_TARGET};
use super::types::{Log, ScriptEntry, ScriptStatus};
use super::utils::{log_file_path, rule_width};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Front end for console and log file output, and the record of script
/// outcomes for the end-of-run summary.
///
/// Messages become [`tracing`] events; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) renders them.
#[derive(Debug)]
pub struct Logger {
    scripts: Mutex<Vec<ScriptEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command`; the summary points at that command's
    /// log file.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger whose summary points at `log_file`.
    #[must_use]
    pub(super) const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// The log file the summary points at.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Snapshot of the outcomes recorded so far.
    #[must_use]
    pub fn script_entries(&self) -> Vec<ScriptEntry> {
        self.scripts.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a section header, e.g. the name of the script about to run.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message; shown on the console only with `--verbose`.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log an action that `--dry-run` skipped.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record the outcome of dispatching `name`.
    pub fn record_script(&self, name: &str, status: ScriptStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.scripts.lock() {
            guard.push(ScriptEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Number of recorded [`ScriptStatus::Failed`] outcomes.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.scripts.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|entry| entry.status == ScriptStatus::Failed)
                .count()
        })
    }

    /// Print one status line per recorded script, then the totals.
    ///
    /// Does nothing when no script was dispatched.
    pub fn print_summary(&self) {
        let entries = self.script_entries();
        if entries.is_empty() {
            return;
        }

        tracing::info!(target: RULE_TARGET, "{}", "─".repeat(rule_width()));
        self.stage("Summary");
        for entry in &entries {
            tracing::info!(
                target: STATUS_TARGET,
                script = entry.name.as_str(),
                status = entry.status.label(),
                detail = entry.message.as_deref().unwrap_or_default()
            );
        }

        let count = |status: ScriptStatus| entries.iter().filter(|e| e.status == status).count();
        self.info(&format!(
            "{} script(s): {} succeeded, {} failed, {} unsupported, {} dry-run",
            entries.len(),
            count(ScriptStatus::Succeeded),
            count(ScriptStatus::Failed),
            count(ScriptStatus::Unsupported),
            count(ScriptStatus::DryRun),
        ));
        if let Some(path) = &self.log_file {
            self.info(&format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_script(&self, name: &str, status: ScriptStatus, message: Option<&str>) {
        self.record_script(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{isolated_logger, script_span};
    use std::fs;

    fn log_contents(log: &Logger) -> String {
        fs::read_to_string(log.log_path().expect("log path")).unwrap()
    }

    #[test]
    fn records_outcomes_in_order() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.script_entries().is_empty());
        log.record_script("runav", ScriptStatus::Unsupported, Some("not on windows"));
        log.record_script("syscfg", ScriptStatus::Succeeded, None);
        let entries = log.script_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "runav");
        assert_eq!(entries[0].message.as_deref(), Some("not on windows"));
        assert_eq!(entries[1].status, ScriptStatus::Succeeded);
    }

    #[test]
    fn failure_count_ignores_refusals() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_script("a", ScriptStatus::Succeeded, None);
        log.record_script("b", ScriptStatus::Failed, Some("error 1"));
        log.record_script("c", ScriptStatus::Failed, Some("error 2"));
        log.record_script("d", ScriptStatus::Unsupported, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn log_trait_records_through_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_script("via-trait", ScriptStatus::Succeeded, None);
        assert_eq!(log.script_entries().len(), 1);
    }

    #[test]
    fn file_starts_with_run_header() {
        let (log, _tmp, _guard) = isolated_logger();
        log.info("first");
        let contents = log_contents(&log);
        assert!(contents.starts_with("# osharden "));
        assert!(contents.contains("# command: test\n"));
    }

    #[test]
    fn lines_inside_script_span_are_tagged() {
        let (log, _tmp, _guard) = isolated_logger();
        {
            let _span = script_span("syscfg").entered();
            log.warn("sysctl.conf is a symlink");
            log.dry_run("would patch /etc/sysctl.conf");
            log.debug("3 directive(s)");
        }
        log.info("back in the menu");

        let contents = log_contents(&log);
        assert!(contents.contains("] ---- syscfg ----\n"));
        assert!(contents.contains("] [syscfg] warn: sysctl.conf is a symlink\n"));
        assert!(contents.contains("] [syscfg] dry-run: would patch /etc/sysctl.conf\n"));
        assert!(contents.contains("] [syscfg] debug: 3 directive(s)\n"));
        assert!(contents.contains("] back in the menu\n"));
    }

    #[test]
    fn summary_writes_status_lines() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_script("syscfg", ScriptStatus::Succeeded, None);
        log.record_script("netapps", ScriptStatus::Failed, Some("netstat missing"));
        log.print_summary();

        let contents = log_contents(&log);
        assert!(contents.contains("==> Summary"));
        assert!(contents.contains("summary: syscfg succeeded\n"));
        assert!(contents.contains("summary: netapps failed (netstat missing)\n"));
        assert!(contents.contains("2 script(s): 1 succeeded, 1 failed, 0 unsupported, 0 dry-run"));
        assert!(!contents.contains('─'));
        assert!(!contents.contains('\x1b'));
    }

    #[test]
    fn empty_summary_writes_nothing() {
        let (log, _tmp, _guard) = isolated_logger();
        log.print_summary();
        assert!(!log_contents(&log).contains("Summary"));
    }
}
