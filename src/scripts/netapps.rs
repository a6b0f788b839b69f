use anyhow::{Context as _, Result};

use super::helpers::{CommandStep, run_step};
use super::{Context, Script};
use crate::platform::Os;

/// Review processes listening on the network.
#[derive(Debug)]
pub struct NetworkApps;

/// One listening socket reported by `netstat -tunlpw`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Listener {
    address: String,
    pid: String,
    process: String,
}

/// Parse `netstat -tunlpw` output, skipping the two header lines.
///
/// Rows without a `pid/program` column (sockets owned by other users when
/// not root) are skipped.
fn parse_listeners(output: &str) -> Vec<Listener> {
    output
        .lines()
        .skip(2)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let address = fields.get(3)?;
            let (pid, program) = fields.get(6)?.split_once('/')?;
            let process = program.split(':').next().unwrap_or(program).trim();
            if pid.is_empty() || process.is_empty() {
                return None;
            }
            Some(Listener {
                address: (*address).to_string(),
                pid: pid.to_string(),
                process: process.to_string(),
            })
        })
        .collect()
}

impl Script for NetworkApps {
    fn name(&self) -> &str {
        "netapps"
    }

    fn description(&self) -> &str {
        "Review processes listening on the network"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux]
    }

    fn run(&self, _os: Os, ctx: &Context) -> Result<()> {
        let output = ctx
            .executor
            .run("netstat", &["-tunlpw"])
            .context("listing listening sockets (is net-tools installed?)")?;
        let listeners = parse_listeners(&output.stdout);
        ctx.log
            .debug(&format!("{} listening socket(s) found", listeners.len()));

        for listener in &listeners {
            let Listener {
                address,
                pid,
                process,
            } = listener;
            if ctx.prompter.confirm(&format!(
                "Should the process {process} (pid={pid}) be listening on {address}?"
            ))? {
                continue;
            }
            let kill = ctx
                .prompter
                .confirm(&format!("Kill process {process} (pid={pid})?"))?;
            let purge = ctx
                .prompter
                .confirm(&format!("Uninstall the package providing {process}?"))?;
            if kill {
                run_step(
                    ctx,
                    &CommandStep::new(&format!("Killing {process}"), "kill", &[pid.as_str()]).ignore_err(),
                )?;
            }
            if purge {
                run_step(
                    ctx,
                    &CommandStep::new(
                        &format!("Purging {process}"),
                        "apt",
                        &["purge", "-y", process.as_str()],
                    )
                    .ignore_err(),
                )?;
            }
        }

        run_step(
            ctx,
            &CommandStep::new("Removing unused dependencies", "apt", &["autoremove", "-y"])
                .ignore_err(),
        )?;
        Ok(())
    }
}
