//! Helper utilities for common script patterns: logged command sequences and
//! directive patching with dry-run awareness.
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::Result;

use super::Context;
use crate::error::{HardenError, PatchError};
use crate::exec::command_line;
use crate::resources::directives::{DirectiveFile, DirectiveSet, remove_content};
use crate::resources::fs::{backup_file, write_atomic};
use crate::resources::{Applicable as _, Resource as _, ResourceChange, ResourceState};

/// A command run as one step of a script, announced with a log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStep {
    /// Message logged before the command runs.
    pub message: String,
    /// Program to execute.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// When set, a failure is logged as a warning and the script continues.
    pub ignore_err: bool,
}

impl CommandStep {
    /// Create a step whose failure aborts the script.
    #[must_use]
    pub fn new(message: &str, program: &str, args: &[&str]) -> Self {
        Self {
            message: message.to_string(),
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            ignore_err: false,
        }
    }

    /// Mark the step's failure as non-fatal.
    #[must_use]
    pub const fn ignore_err(mut self) -> Self {
        self.ignore_err = true;
        self
    }

    /// Full command line, for logging.
    #[must_use]
    pub fn command_line(&self) -> String {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        command_line(&self.program, &args)
    }
}

/// Run one step attached to the terminal.
///
/// # Errors
///
/// Returns [`HardenError::Command`] if the command fails and the step is not
/// marked `ignore_err`.
pub fn run_step(ctx: &Context, step: &CommandStep) -> Result<(), HardenError> {
    ctx.log.info(&step.message);
    if ctx.dry_run {
        ctx.log.dry_run(&format!("would run: {}", step.command_line()));
        return Ok(());
    }
    let args: Vec<&str> = step.args.iter().map(String::as_str).collect();
    match ctx.executor.run_interactive(&step.program, &args) {
        Ok(()) => Ok(()),
        Err(e) if step.ignore_err => {
            ctx.log.warn(&format!("{e} (ignored)"));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run steps in order, stopping at the first fatal failure.
///
/// # Errors
///
/// Returns the first non-ignorable step failure.
pub fn run_steps(ctx: &Context, steps: &[CommandStep]) -> Result<(), HardenError> {
    steps.iter().try_for_each(|step| run_step(ctx, step))
}

/// Patch `path` so it carries `desired`, honouring dry-run and backups.
///
/// # Errors
///
/// Returns an error if the file cannot be read, backed up, or replaced.
pub fn patch_file(
    ctx: &Context,
    path: &Path,
    separator: &str,
    desired: DirectiveSet,
) -> Result<ResourceChange> {
    let resource =
        DirectiveFile::new(path, separator, desired).with_backup_dir(ctx.backup_dir.clone());
    match resource.current_state()? {
        ResourceState::Correct => {
            ctx.log
                .debug(&format!("ok: {} (already in desired state)", resource.description()));
            Ok(ResourceChange::AlreadyCorrect)
        }
        state if ctx.dry_run => {
            let detail = match state {
                ResourceState::Incorrect { current } => current,
                _ => "missing".to_string(),
            };
            ctx.log
                .dry_run(&format!("would patch {}: {detail}", resource.description()));
            Ok(ResourceChange::Applied)
        }
        _ => {
            let change = resource.apply()?;
            ctx.log.info(&format!("updated {}", resource.description()));
            Ok(change)
        }
    }
}

/// Remove active directives named in `keys` from `path`, honouring dry-run.
///
/// Returns the number of lines removed (or that would be removed).
///
/// # Errors
///
/// Returns [`HardenError::Patch`] if the file cannot be read or replaced.
pub fn remove_lines(
    ctx: &Context,
    path: &Path,
    separator: &str,
    keys: &BTreeSet<String>,
) -> Result<usize, HardenError> {
    if keys.is_empty() {
        return Ok(0);
    }
    if ctx.dry_run {
        let list: Vec<&str> = keys.iter().map(String::as_str).collect();
        ctx.log.dry_run(&format!(
            "would remove from {}: {}",
            path.display(),
            list.join(", ")
        ));
        return Ok(keys.len());
    }
    let original = fs::read_to_string(path).map_err(|e| PatchError::io(path, e))?;
    let (content, removed) = remove_content(&original, separator, keys);
    if removed == 0 {
        ctx.log
            .debug(&format!("ok: {} (nothing to remove)", path.display()));
        return Ok(0);
    }
    if let Some(dir) = &ctx.backup_dir {
        backup_file(path, dir).map_err(|e| PatchError::io(path, e))?;
    }
    write_atomic(path, &content).map_err(|e| PatchError::io(path, e))?;
    ctx.log
        .info(&format!("removed {removed} line(s) from {}", path.display()));
    Ok(removed)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::platform::Os;
    use crate::resources::directives::directive_set;
    use crate::scripts::test_helpers::Fixture;
    use std::fs;

    // -----------------------------------------------------------------------
    // run_steps
    // -----------------------------------------------------------------------

    #[test]
    fn ignorable_failure_continues() {
        let fx = Fixture::new(Os::Linux)
            .responses(vec![(false, String::new())])
            .build();
        let steps = [
            CommandStep::new("Installing UFW", "apt", &["install", "ufw"]).ignore_err(),
            CommandStep::new("Enabling UFW", "ufw", &["enable"]),
        ];
        run_steps(&fx.ctx, &steps).unwrap();
        assert_eq!(fx.executor.calls(), vec!["apt install ufw", "ufw enable"]);
    }

    #[test]
    fn fatal_failure_stops_sequence() {
        let fx = Fixture::new(Os::Linux)
            .responses(vec![(false, String::new())])
            .build();
        let steps = [
            CommandStep::new("Enabling UFW", "ufw", &["enable"]),
            CommandStep::new("Allowing SSH", "ufw", &["allow", "openssh"]),
        ];
        let err = run_steps(&fx.ctx, &steps).unwrap_err();
        assert!(matches!(
            err,
            HardenError::Command(CommandError::Failed { .. })
        ));
        assert_eq!(fx.executor.calls(), vec!["ufw enable"]);
    }

    #[test]
    fn dry_run_issues_no_commands() {
        let mut fx = Fixture::new(Os::Linux).build();
        fx.ctx.dry_run = true;
        run_steps(&fx.ctx, &[CommandStep::new("Scanning", "clamscan", &["-r", "/"])]).unwrap();
        assert!(fx.executor.calls().is_empty());
    }

    #[test]
    fn step_command_line() {
        let step = CommandStep::new("x", "net", &["accounts", "/minpwlen:8"]);
        assert_eq!(step.command_line(), "net accounts /minpwlen:8");
        assert!(!step.ignore_err);
        assert!(step.ignore_err().ignore_err);
    }

    // -----------------------------------------------------------------------
    // patch_file
    // -----------------------------------------------------------------------

    #[test]
    fn patch_file_applies_and_reports() {
        let fx = Fixture::new(Os::Linux).build();
        let path = fx.dir.path().join("sysctl.conf");
        fs::write(&path, "kernel.exec-shield = 0\n").unwrap();
        let change = patch_file(
            &fx.ctx,
            &path,
            " = ",
            directive_set([("kernel.exec-shield", "1")]),
        )
        .unwrap();
        assert_eq!(change, ResourceChange::Applied);
        assert_eq!(fs::read_to_string(&path).unwrap(), "kernel.exec-shield = 1\n");

        let again = patch_file(
            &fx.ctx,
            &path,
            " = ",
            directive_set([("kernel.exec-shield", "1")]),
        )
        .unwrap();
        assert_eq!(again, ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn patch_file_dry_run_leaves_file() {
        let mut fx = Fixture::new(Os::Linux).build();
        fx.ctx.dry_run = true;
        let path = fx.dir.path().join("sysctl.conf");
        fs::write(&path, "kernel.exec-shield = 0\n").unwrap();
        patch_file(
            &fx.ctx,
            &path,
            " = ",
            directive_set([("kernel.exec-shield", "1")]),
        )
        .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kernel.exec-shield = 0\n");
    }

    #[test]
    fn patch_file_writes_backup_when_enabled() {
        let mut fx = Fixture::new(Os::Linux).build();
        let backups = fx.dir.path().join("backups");
        fx.ctx.backup_dir = Some(backups.clone());
        let path = fx.dir.path().join("login.defs");
        fs::write(&path, "PASS_MAX_DAYS 99999\n").unwrap();
        patch_file(&fx.ctx, &path, " ", directive_set([("PASS_MAX_DAYS", "30")])).unwrap();
        assert_eq!(fs::read_dir(backups).unwrap().count(), 1);
    }

    // -----------------------------------------------------------------------
    // remove_lines
    // -----------------------------------------------------------------------

    #[test]
    fn remove_lines_drops_keys() {
        let fx = Fixture::new(Os::Linux).build();
        let path = fx.dir.path().join("hosts");
        fs::write(&path, "127.0.0.1 localhost\n10.1.1.1 bad\n").unwrap();
        let keys: BTreeSet<String> = ["10.1.1.1".to_string()].into();
        assert_eq!(remove_lines(&fx.ctx, &path, " ", &keys).unwrap(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "127.0.0.1 localhost\n");
    }

    #[test]
    fn remove_lines_without_match_writes_no_backup() {
        let mut fx = Fixture::new(Os::Linux).build();
        let backups = fx.dir.path().join("backups");
        fx.ctx.backup_dir = Some(backups.clone());
        let path = fx.dir.path().join("hosts");
        fs::write(&path, "127.0.0.1 localhost\n").unwrap();
        let keys: BTreeSet<String> = ["10.1.1.1".to_string()].into();

        assert_eq!(remove_lines(&fx.ctx, &path, " ", &keys).unwrap(), 0);
        assert!(!backups.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "127.0.0.1 localhost\n");
    }

    #[test]
    fn remove_lines_backs_up_before_removing() {
        let mut fx = Fixture::new(Os::Linux).build();
        let backups = fx.dir.path().join("backups");
        fx.ctx.backup_dir = Some(backups.clone());
        let path = fx.dir.path().join("hosts");
        fs::write(&path, "127.0.0.1 localhost\n10.1.1.1 bad\n").unwrap();
        let keys: BTreeSet<String> = ["10.1.1.1".to_string()].into();

        assert_eq!(remove_lines(&fx.ctx, &path, " ", &keys).unwrap(), 1);
        let saved: Vec<_> = fs::read_dir(&backups).unwrap().map(|e| e.unwrap().path()).collect();
        assert_eq!(saved.len(), 1);
        assert_eq!(
            fs::read_to_string(&saved[0]).unwrap(),
            "127.0.0.1 localhost\n10.1.1.1 bad\n"
        );
    }

    #[test]
    fn remove_lines_missing_file_is_patch_error() {
        let fx = Fixture::new(Os::Linux).build();
        let keys: BTreeSet<String> = ["x".to_string()].into();
        let err = remove_lines(&fx.ctx, &fx.dir.path().join("absent"), " ", &keys).unwrap_err();
        assert!(matches!(err, HardenError::Patch(_)));
    }
}
