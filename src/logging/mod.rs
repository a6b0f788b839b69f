//! Console and log file output for hardening runs.
//!
//! Commands and scripts log through [`Logger`] (or the [`Log`] trait);
//! [`init_subscriber`] decides where the events go.  Every script dispatch
//! runs inside a [`script_span`], which is how log file lines know which
//! script wrote them.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, ScriptEntry, ScriptStatus};

/// Span wrapping the dispatch of the script called `name`.
#[must_use]
pub fn script_span(name: &str) -> tracing::Span {
    tracing::info_span!("script", script = name)
}

/// A [`Logger`] whose events go to a fresh log file in a temporary
/// directory, for as long as the returned guard lives.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.log");
    let file_layer =
        subscriber::FileLayer::create(&path, "test", &[]).expect("log file in temp dir");
    let registry =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(registry));
    (Logger::with_log_file(Some(path)), dir, guard)
}
