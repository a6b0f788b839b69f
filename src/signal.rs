//! Ctrl-C handling.
use std::io::Write as _;

use anyhow::{Context as _, Result};

/// Exit status used when the user interrupts a run.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Sequence that makes a cursor hidden by a prompt visible again.
const SHOW_CURSOR: &[u8] = b"\x1b[?25h";

/// Install a handler that logs the interruption, restores the terminal
/// cursor and exits with [`INTERRUPTED_EXIT_CODE`].
///
/// Control never returns to the interrupted script.
///
/// # Errors
///
/// Returns an error if a handler is already installed.
pub fn install_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        tracing::warn!("interrupted, exiting");
        let mut out = std::io::stdout();
        let _ = out.write_all(SHOW_CURSOR);
        let _ = out.flush();
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
    .context("installing Ctrl-C handler")
}
