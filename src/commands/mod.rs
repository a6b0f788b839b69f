pub mod completions;
pub mod interactive;
pub mod list;
pub mod run;
pub mod version;

use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger, ScriptStatus};
use crate::platform::Platform;
use crate::prompt::TerminalPrompter;
use crate::scripts::{Context, Script, ScriptRegistry};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates configuration loading, platform detection and registry
/// construction so that each command does not repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Arc<Platform>,
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Every script shipped with the tool.
    pub registry: ScriptRegistry,
}

impl CommandSetup {
    /// Load the configuration, detect the platform and build the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be
    /// parsed.
    pub fn init(global: &GlobalOpts, log: &Logger, executor: &dyn Executor) -> Result<Self> {
        let config = Config::load(global.config.as_deref())?;
        let platform = Platform::detect(executor);
        log.debug(&format!(
            "platform: {} (elevated: {})",
            platform.os, platform.elevated
        ));
        if let Some(root) = &config.home_root {
            log.debug(&format!("home root: {}", root.display()));
        }
        Ok(Self {
            platform: Arc::new(platform),
            config: Arc::new(config),
            registry: ScriptRegistry::with_defaults(),
        })
    }

    /// Refuse to continue without root / Administrator unless the user
    /// opted out of the check.
    ///
    /// # Errors
    ///
    /// Returns an error when the process is not elevated and
    /// `--allow-unprivileged` was not given.
    pub fn require_privileges(&self, global: &GlobalOpts, log: &Logger) -> Result<()> {
        if self.platform.elevated {
            return Ok(());
        }
        if global.allow_unprivileged || global.dry_run {
            log.warn(&format!(
                "running without elevated privileges; {}",
                self.platform.privilege_hint()
            ));
            return Ok(());
        }
        anyhow::bail!("insufficient privileges: {}", self.platform.privilege_hint());
    }

    /// Build the script context wired to the real system.
    #[must_use]
    pub fn context(&self, global: &GlobalOpts, log: Arc<Logger>) -> Context {
        Context::new(
            Arc::clone(&self.config),
            Arc::clone(&self.platform),
            log as Arc<dyn Log>,
            Arc::new(SystemExecutor),
            Arc::new(TerminalPrompter),
            global.dry_run,
            global.backup,
        )
    }
}

/// Execute every script in order, print the summary, and bail if any script
/// failed.
///
/// # Errors
///
/// Returns an error if one or more scripts recorded a failure.
pub fn run_scripts_to_completion<'a>(
    scripts: impl IntoIterator<Item = &'a dyn Script>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for script in scripts {
        if ScriptRegistry::execute(script, ctx) == ScriptStatus::Failed {
            log.debug(&format!("continuing after {} failed", script.name()));
        }
    }
    finish(log)
}

/// Print the run summary and turn recorded failures into an error.
///
/// # Errors
///
/// Returns an error if one or more scripts recorded a failure.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} script(s) failed");
    }
    Ok(())
}
