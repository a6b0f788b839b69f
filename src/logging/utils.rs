//! Small helpers for the log file and the run summary.
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

/// The summary rule is never drawn wider than this.
const MAX_RULE_WIDTH: usize = 60;

/// Width of the summary rule for a terminal of `columns` columns.
pub(super) fn rule_width_for(columns: Option<usize>) -> usize {
    columns.filter(|&n| n > 0).unwrap_or(80).min(MAX_RULE_WIDTH)
}

/// Width of the summary rule for the attached terminal.
///
/// `COLUMNS` takes precedence over the size the terminal reports.
pub(super) fn rule_width() -> usize {
    let columns = std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .or_else(|| terminal_size::terminal_size().map(|(w, _)| usize::from(w.0)));
    rule_width_for(columns)
}

/// `<dir>/<command>.log`.
pub(super) fn log_file_in(dir: &Path, command: &str) -> PathBuf {
    dir.join(format!("{command}.log"))
}

/// Log file for `command` under the cache directory, which is created if
/// missing.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = crate::config::cache_dir();
    fs::create_dir_all(&dir).ok()?;
    Some(log_file_in(&dir, command))
}

/// RFC 3339 UTC timestamp recorded in the log header.
pub(super) fn started_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `HH:MM:SS` UTC clock prefixed to every log line.
pub(super) fn clock() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
