//! Console formatting and the per-command log file.
//!
//! Events are told apart by target: stage headers, dry-run notes, summary
//! status lines and the summary rule each get their own rendering.  Status
//! events carry the script and its [`ScriptStatus`] as structured fields
//! rather than preformatted text.
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write as _};
use std::path::Path;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context as LayerContext;
use tracing_subscriber::registry::LookupSpan;

use super::types::ScriptStatus;
use super::utils::{clock, log_file_path, started_at};
use crate::platform::Os;

pub(super) const STAGE_TARGET: &str = "osharden::stage";
pub(super) const DRY_RUN_TARGET: &str = "osharden::dry_run";
/// Summary line for one script: `script`, `status` and `detail` fields.
pub(super) const STATUS_TARGET: &str = "osharden::status";
/// Horizontal rule above the summary; console only.
pub(super) const RULE_TARGET: &str = "osharden::rule";
/// Name of the span opened around each script dispatch.
pub(super) const SCRIPT_SPAN: &str = "script";

/// Fields this crate puts on its events and spans.
#[derive(Debug, Default)]
struct Fields {
    message: String,
    script: Option<String>,
    status: Option<String>,
    detail: Option<String>,
}

impl Fields {
    fn of_event(event: &Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    fn set(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            "script" => self.script = Some(value),
            "status" => self.status = Some(value),
            "detail" => self.detail = Some(value).filter(|d| !d.is_empty()),
            _ => {}
        }
    }

    fn status(&self) -> Option<ScriptStatus> {
        self.status.as_deref().and_then(ScriptStatus::from_label)
    }

    fn script(&self) -> &str {
        self.script.as_deref().unwrap_or("?")
    }

    fn detail_suffix(&self) -> String {
        self.detail
            .as_deref()
            .map_or_else(String::new, |d| format!(" ({d})"))
    }
}

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.set(field, format!("{value:?}"));
    }
}

/// Name of the script whose span is open, stored in the span's extensions.
struct ScriptName(String);

/// Appends plain lines to `<cache dir>/<command>.log`.
///
/// Lines emitted inside a script span are tagged `[<script>]`, and each
/// script's section opens with a `---- <script> ----` marker.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Open the log file for `command` in the cache directory.
    ///
    /// `None` when the cache directory or the file is unavailable; the run
    /// then logs to the console only.
    pub(super) fn new(command: &str, scripts: &[String]) -> Option<Self> {
        Self::create(&log_file_path(command)?, command, scripts).ok()
    }

    /// Truncate `path` and write the run header.
    pub(super) fn create(path: &Path, command: &str, scripts: &[String]) -> io::Result<Self> {
        fs::write(path, run_header(command, scripts))?;
        let file = fs::OpenOptions::new().append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "[{}] {line}", clock()).ok();
        }
    }
}

/// The block opening every log file: version, command and requested
/// scripts, host OS and start time.
fn run_header(command: &str, scripts: &[String]) -> String {
    let invocation = if scripts.is_empty() {
        command.to_string()
    } else {
        format!("{command} {}", scripts.join(" "))
    };
    format!(
        "# osharden {}\n# command: {invocation}\n# host: {}\n# started: {}\n",
        crate::commands::version::version(),
        Os::current(),
        started_at(),
    )
}

/// The log file rendering of an event, or `None` for console-only events.
fn file_line(fields: &Fields, level: Level, target: &str, script: Option<&str>) -> Option<String> {
    let tag = script.map_or_else(String::new, |s| format!("[{s}] "));
    let msg = &fields.message;
    let line = match target {
        RULE_TARGET => return None,
        STAGE_TARGET => format!("==> {msg}"),
        DRY_RUN_TARGET => format!("{tag}dry-run: {msg}"),
        STATUS_TARGET => format!(
            "summary: {} {}{}",
            fields.script(),
            fields.status().map_or("unknown", ScriptStatus::label),
            fields.detail_suffix()
        ),
        _ => match level {
            Level::ERROR => format!("{tag}error: {msg}"),
            Level::WARN => format!("{tag}warn: {msg}"),
            Level::INFO => format!("{tag}{msg}"),
            _ => format!("{tag}debug: {msg}"),
        },
    };
    Some(line)
}

impl<S> Layer<S> for FileLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: LayerContext<'_, S>) {
        if attrs.metadata().name() != SCRIPT_SPAN {
            return;
        }
        let mut fields = Fields::default();
        attrs.record(&mut fields);
        let Some(name) = fields.script else {
            return;
        };
        self.write_line(&format!("---- {name} ----"));
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(ScriptName(name));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: LayerContext<'_, S>) {
        let script = ctx.event_scope(event).and_then(|scope| {
            scope.from_root().find_map(|span| {
                span.extensions()
                    .get::<ScriptName>()
                    .map(|name| name.0.clone())
            })
        });
        let metadata = event.metadata();
        let fields = Fields::of_event(event);
        if let Some(line) = file_line(&fields, *metadata.level(), metadata.target(), script.as_deref())
        {
            self.write_line(&line);
        }
    }
}

/// The console rendering of an event.
fn console_line(fields: &Fields, level: Level, target: &str) -> String {
    let msg = &fields.message;
    match target {
        STAGE_TARGET => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
        DRY_RUN_TARGET => format!("  \x1b[33m[dry run]\x1b[0m {msg}"),
        RULE_TARGET => format!("\x1b[2m{msg}\x1b[0m"),
        STATUS_TARGET => {
            let (icon, color) = match fields.status() {
                Some(ScriptStatus::Succeeded) => ("✓", "\x1b[32m"),
                Some(ScriptStatus::Failed) => ("✗", "\x1b[31m"),
                Some(ScriptStatus::DryRun) => ("~", "\x1b[37m"),
                Some(ScriptStatus::Unsupported) | None => ("·", "\x1b[2m"),
            };
            format!(
                "{color}{icon} {}{}\x1b[0m",
                fields.script(),
                fields.detail_suffix()
            )
        }
        _ => match level {
            Level::ERROR => format!("\x1b[31merror\x1b[0m {msg}"),
            Level::WARN => format!("\x1b[33mwarn\x1b[0m  {msg}"),
            Level::INFO => format!("  {msg}"),
            _ => format!("  \x1b[2m{msg}\x1b[0m"),
        },
    }
}

/// Console [`FormatEvent`] over [`console_line`].
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let fields = Fields::of_event(event);
        writeln!(writer, "{}", console_line(&fields, *metadata.level(), metadata.target()))
    }
}

/// Install the global subscriber for one invocation of `command`.
///
/// `scripts` are the script names requested on the command line, recorded in
/// the log header.  Warnings and errors go to stderr, the rest to stdout;
/// `RUST_LOG` overrides the console level.  The log file always receives
/// debug events.
pub fn init_subscriber(verbose: bool, command: &str, scripts: &[String]) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let writer = io::stderr
        .with_max_level(Level::WARN)
        .and(io::stdout.with_min_level(Level::INFO));

    let console = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(writer)
        .with_filter(console_filter);
    let file = FileLayer::new(command, scripts).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
