use std::collections::BTreeSet;
use std::fs;
use std::net::IpAddr;

use anyhow::{Context as _, Result};

use super::helpers::remove_lines;
use super::{Context, Script};
use crate::platform::Os;

/// Review static host entries and drop the ones the user rejects.
#[derive(Debug)]
pub struct VerifyHosts;

/// Active `address name...` entries, in file order.
///
/// Fields are separated by single spaces; lines whose first field is not an
/// IP address are ignored.
fn host_entries(content: &str) -> Vec<(&str, Vec<&str>)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split(' ').filter(|f| !f.is_empty());
            let ip = fields.next()?;
            ip.parse::<IpAddr>().ok()?;
            Some((ip, fields.collect()))
        })
        .collect()
}

impl Script for VerifyHosts {
    fn name(&self) -> &str {
        "vfhosts"
    }

    fn description(&self) -> &str {
        "Review and prune /etc/hosts entries"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux]
    }

    fn run(&self, _os: Os, ctx: &Context) -> Result<()> {
        let path = &ctx.config.paths.hosts;
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

        let mut rejected = BTreeSet::new();
        for (ip, names) in host_entries(&content) {
            let question = format!("Should {ip} redirect to [{}]?", names.join(", "));
            if !ctx.prompter.confirm(&question)? {
                rejected.insert(ip.to_string());
            }
        }
        if rejected.is_empty() {
            ctx.log.info("all host entries kept");
            return Ok(());
        }
        remove_lines(ctx, path, " ", &rejected)?;
        Ok(())
    }
}
