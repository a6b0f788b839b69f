use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::helpers::{CommandStep, run_step};
use super::{Context, Script};
use crate::platform::Os;

/// Remove unauthorized accounts and demote unauthorized administrators.
#[derive(Debug)]
pub struct AllowedUsers;

/// Names of the directories directly under `root`, sorted.
fn home_users(root: &Path) -> Result<Vec<String>> {
    let mut users = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("reading {}", root.display()))? {
        let entry = entry.with_context(|| format!("reading {}", root.display()))?;
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            users.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    users.sort();
    Ok(users)
}

/// Members listed by `net localgroup Administrators`, minus the built-in
/// `Administrator` account.
fn parse_administrators(output: &str) -> Vec<String> {
    let Some((_, members)) = output.split_once("\n---") else {
        return Vec::new();
    };
    members
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && *line != "Administrator"
                && !line.starts_with("The command completed successfully.")
        })
        .map(String::from)
        .collect()
}

impl AllowedUsers {
    fn run_linux(ctx: &Context) -> Result<()> {
        let root = ctx.config.home_root(Os::Linux);
        for user in home_users(&root)? {
            if !ctx
                .prompter
                .confirm(&format!("Is the user {user} allowed on this machine?"))?
            {
                run_step(
                    ctx,
                    &CommandStep::new(
                        &format!("Removing user {user}"),
                        "deluser",
                        &["--remove-home", user.as_str()],
                    ),
                )?;
                continue;
            }

            let groups = ctx.executor.run("groups", &[user.as_str()])?;
            let is_sudoer = groups
                .stdout
                .split_whitespace()
                .any(|group| group == "sudo");
            if is_sudoer
                && !ctx
                    .prompter
                    .confirm(&format!("Is the user {user} allowed to be an administrator?"))?
            {
                run_step(
                    ctx,
                    &CommandStep::new(
                        &format!("Removing {user} from sudo"),
                        "deluser",
                        &[user.as_str(), "sudo"],
                    ),
                )?;
            }
        }
        Ok(())
    }

    fn run_windows(ctx: &Context) -> Result<()> {
        let output = ctx
            .executor
            .run("net", &["localgroup", "Administrators"])?;
        let admins = parse_administrators(&output.stdout);
        ctx.log
            .debug(&format!("administrators: {}", admins.join(", ")));

        let root = ctx.config.home_root(Os::Windows);
        for user in home_users(&root)? {
            if !ctx
                .prompter
                .confirm(&format!("Is the user {user} allowed on this machine?"))?
            {
                run_step(
                    ctx,
                    &CommandStep::new(
                        &format!("Removing user {user}"),
                        "net",
                        &["user", user.as_str(), "/delete"],
                    )
                    .ignore_err(),
                )?;
                continue;
            }

            if admins.contains(&user)
                && !ctx
                    .prompter
                    .confirm(&format!("Is the user {user} allowed to be an administrator?"))?
            {
                run_step(
                    ctx,
                    &CommandStep::new(
                        &format!("Removing {user} from Administrators"),
                        "net",
                        &["localgroup", "Administrators", user.as_str(), "/delete"],
                    )
                    .ignore_err(),
                )?;
            }
        }
        Ok(())
    }
}

impl Script for AllowedUsers {
    fn name(&self) -> &str {
        "users-allowed"
    }

    fn description(&self) -> &str {
        "Remove unauthorized users and administrators"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux, Os::Windows]
    }

    fn run(&self, os: Os, ctx: &Context) -> Result<()> {
        match os {
            Os::Linux => Self::run_linux(ctx),
            Os::Windows => Self::run_windows(ctx),
        }
    }
}
