//! Command: dispatch named scripts in order.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, run_scripts_to_completion};
use crate::cli::{GlobalOpts, RunOpts};
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::scripts::{Context, Script, ScriptRegistry};

/// Run the `run` command.
///
/// # Errors
///
/// Returns an error if configuration loading fails, privileges are missing,
/// a name is unknown, or any script fails.
pub fn run(global: &GlobalOpts, opts: &RunOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log, &SystemExecutor)?;
    setup.require_privileges(global, log)?;
    let ctx = setup.context(global, Arc::clone(log));
    run_named(&setup.registry, &opts.names, &ctx, log)
}

/// Resolve every name first, then dispatch the scripts in the order given.
///
/// # Errors
///
/// Returns an error naming the unknown scripts before anything runs, or the
/// number of scripts that failed.
pub fn run_named(
    registry: &ScriptRegistry,
    names: &[String],
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    let unknown: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| registry.lookup(name).is_none())
        .collect();
    if !unknown.is_empty() {
        anyhow::bail!(
            "unknown script(s): {} (see `osharden list --all`)",
            unknown.join(", ")
        );
    }

    let scripts: Vec<&dyn Script> = names
        .iter()
        .filter_map(|name| registry.lookup(name))
        .collect();
    run_scripts_to_completion(scripts, ctx, log)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::ScriptStatus;
    use crate::platform::Os;
    use crate::scripts::test_helpers::Fixture;
    use std::fs;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn unknown_name_runs_nothing() {
        let fx = Fixture::new(Os::Linux).build();
        let registry = ScriptRegistry::with_defaults();
        let err = run_named(
            &registry,
            &names(&["programs-update", "nope"]),
            &fx.ctx,
            &fx.log,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown script(s): nope"));
        assert!(fx.executor.calls().is_empty());
        assert!(fx.log.script_entries().is_empty());
    }

    #[test]
    fn unsupported_script_is_recorded_not_fatal() {
        let fx = Fixture::new(Os::Windows).build();
        let registry = ScriptRegistry::with_defaults();
        run_named(&registry, &names(&["syscfg"]), &fx.ctx, &fx.log).unwrap();
        let entries = fx.log.script_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().status, ScriptStatus::Unsupported);
    }

    #[test]
    fn scripts_run_in_given_order_and_failures_bail() {
        let fx = Fixture::new(Os::Linux).build();
        fs::write(&fx.ctx.config.paths.sysctl, "").unwrap();
        let registry = ScriptRegistry::with_defaults();

        let err = run_named(
            &registry,
            &names(&["programs-update", "vfhosts", "syscfg"]),
            &fx.ctx,
            &fx.log,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "1 script(s) failed");
        let statuses: Vec<(String, ScriptStatus)> = fx
            .log
            .script_entries()
            .into_iter()
            .map(|e| (e.name, e.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("programs-update".to_string(), ScriptStatus::Succeeded),
                ("vfhosts".to_string(), ScriptStatus::Failed),
                ("syscfg".to_string(), ScriptStatus::Succeeded),
            ]
        );
    }
}
