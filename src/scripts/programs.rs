use anyhow::Result;

use super::helpers::{CommandStep, run_step, run_steps};
use super::{Context, Script};
use crate::platform::Os;

/// Offer to uninstall each configured unauthorized program.
#[derive(Debug)]
pub struct RemovePrograms;

impl Script for RemovePrograms {
    fn name(&self) -> &str {
        "rmprograms"
    }

    fn description(&self) -> &str {
        "Uninstall unauthorized programs"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux]
    }

    fn run(&self, _os: Os, ctx: &Context) -> Result<()> {
        for program in &ctx.config.unauthorized_programs {
            if !ctx
                .prompter
                .confirm(&format!("Would you like to uninstall {program}?"))?
            {
                continue;
            }
            run_step(
                ctx,
                &CommandStep::new(
                    &format!("Removing {program}"),
                    "apt",
                    &["remove", "-y", program],
                )
                .ignore_err(),
            )?;
        }
        run_step(
            ctx,
            &CommandStep::new("Removing unused dependencies", "apt", &["autoremove", "-y"])
                .ignore_err(),
        )?;
        Ok(())
    }
}

/// Refresh package lists and upgrade installed packages.
#[derive(Debug)]
pub struct UpdatePrograms;

impl Script for UpdatePrograms {
    fn name(&self) -> &str {
        "programs-update"
    }

    fn description(&self) -> &str {
        "Update installed packages"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux]
    }

    fn run(&self, _os: Os, ctx: &Context) -> Result<()> {
        run_steps(
            ctx,
            &[
                CommandStep::new("Updating package lists", "apt", &["update"]),
                CommandStep::new("Upgrading packages", "apt", &["upgrade", "-y"]),
            ],
        )?;
        Ok(())
    }
}
