//! Command: pick scripts from a menu until the user quits.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, finish};
use crate::cli::GlobalOpts;
use crate::exec::SystemExecutor;
use crate::logging::{Logger, ScriptStatus};
use crate::scripts::{Context, ScriptRegistry};

const QUIT: &str = "quit";

/// Run the `interactive` command.
///
/// # Errors
///
/// Returns an error if configuration loading fails, privileges are missing,
/// the terminal cannot be read, or any chosen script fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log, &SystemExecutor)?;
    setup.require_privileges(global, log)?;
    let ctx = setup.context(global, Arc::clone(log));
    menu_loop(&setup.registry, &ctx)?;
    finish(log)
}

/// Offer the scripts supported on the host until the user picks quit or
/// backs out of the menu.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub fn menu_loop(registry: &ScriptRegistry, ctx: &Context) -> Result<()> {
    let supported = registry.list_supported(ctx.platform.os);
    let scripts: Vec<_> = supported.into_values().collect();
    let mut items: Vec<String> = scripts
        .iter()
        .map(|s| format!("{:<16} {}", s.name(), s.description()))
        .collect();
    items.push(QUIT.to_string());

    loop {
        let choice = ctx
            .prompter
            .select("Which script would you like to run?", &items)?;
        let Some(script) = choice.and_then(|i| scripts.get(i)) else {
            break;
        };
        if ScriptRegistry::execute(*script, ctx) == ScriptStatus::Failed {
            ctx.log
                .warn(&format!("{} failed, returning to the menu", script.name()));
        }
    }
    ctx.log.debug("leaving interactive menu");
    Ok(())
}
