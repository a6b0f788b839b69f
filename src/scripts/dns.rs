use std::collections::BTreeSet;
use std::fs;
use std::net::IpAddr;

use anyhow::{Context as _, Result};

use super::{Context, Script};
use crate::error::PatchError;
use crate::platform::Os;
use crate::resources::fs::{backup_file, write_atomic};

/// Review configured name servers and add trusted ones.
#[derive(Debug)]
pub struct UpdateDns;

/// Addresses of the `nameserver` lines in `content`, in file order.
fn nameservers(content: &str) -> Vec<&str> {
    content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("nameserver"))
        .filter_map(|rest| rest.split_whitespace().next())
        .collect()
}

/// Drop the `nameserver` lines for `remove` and append one for each of `add`.
fn rewrite_resolv(content: &str, remove: &BTreeSet<&str>, add: &[IpAddr]) -> String {
    let mut lines: Vec<String> = content
        .lines()
        .filter(|line| {
            let server = line
                .trim()
                .strip_prefix("nameserver")
                .and_then(|rest| rest.split_whitespace().next());
            !server.is_some_and(|s| remove.contains(s))
        })
        .map(String::from)
        .collect();
    lines.extend(add.iter().map(|ip| format!("nameserver {ip}")));
    if lines.is_empty() {
        return String::new();
    }
    lines.join("\n") + "\n"
}

impl UpdateDns {
    fn ask_new_servers(ctx: &Context) -> Result<Vec<IpAddr>> {
        let mut added = Vec::new();
        if !ctx.prompter.confirm("Would you like to add new DNS servers?")? {
            return Ok(added);
        }
        loop {
            let answer = ctx
                .prompter
                .input("DNS server IP address (empty to finish)")?;
            let answer = answer.trim();
            if answer.is_empty() {
                break;
            }
            match answer.parse::<IpAddr>() {
                Ok(ip) => added.push(ip),
                Err(_) => {
                    ctx.log
                        .error(&format!("'{answer}' is not a valid IP address"));
                    continue;
                }
            }
            if !ctx.prompter.confirm("Add another DNS server?")? {
                break;
            }
        }
        Ok(added)
    }
}

impl Script for UpdateDns {
    fn name(&self) -> &str {
        "dns-update"
    }

    fn description(&self) -> &str {
        "Review and update DNS name servers"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux]
    }

    fn run(&self, _os: Os, ctx: &Context) -> Result<()> {
        let path = &ctx.config.paths.resolv;
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

        let mut remove = BTreeSet::new();
        for server in nameservers(&content) {
            ctx.log.info(&format!("Found DNS server: {server}"));
            if ctx
                .prompter
                .confirm(&format!("Remove DNS server {server}?"))?
            {
                remove.insert(server);
            }
        }
        let add = Self::ask_new_servers(ctx)?;

        let updated = rewrite_resolv(&content, &remove, &add);
        if updated == content {
            ctx.log.info("DNS servers unchanged");
            return Ok(());
        }
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would update {}: remove {}, add {}",
                path.display(),
                remove.len(),
                add.len()
            ));
            return Ok(());
        }
        if let Some(dir) = &ctx.backup_dir {
            backup_file(path, dir).map_err(|e| PatchError::io(path, e))?;
        }
        write_atomic(path, &updated).map_err(|e| PatchError::io(path, e))?;
        ctx.log.info(&format!("updated {}", path.display()));
        Ok(())
    }
}
