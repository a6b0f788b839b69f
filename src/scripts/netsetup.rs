use anyhow::Result;

use super::helpers::{CommandStep, patch_file, run_steps};
use super::{Context, Script};
use crate::platform::Os;
use crate::resources::directives::DirectiveSet;

/// Optional network hardening: the question asked and the kernel parameters
/// set when the user agrees.
const SYSCTL_PROMPTS: &[(&str, &[(&str, &str)])] = &[
    (
        "Enable TCP SYN cookie protection?",
        &[("net.ipv4.tcp_syncookies", "1")],
    ),
    (
        "Enable TIME-WAIT assassination protection?",
        &[("net.ipv4.tcp_rfc1337", "1")],
    ),
    (
        "Disable IPv4 forwarding?",
        &[("net.ipv4.ip_forward", "0")],
    ),
    (
        "Disable source routing?",
        &[
            ("net.ipv4.conf.all.accept_source_route", "0"),
            ("net.ipv4.conf.default.accept_source_route", "0"),
        ],
    ),
    (
        "Disable sending ICMP redirects?",
        &[
            ("net.ipv4.conf.all.send_redirects", "0"),
            ("net.ipv4.conf.default.send_redirects", "0"),
        ],
    ),
    (
        "Log Martian packets?",
        &[("net.ipv4.conf.all.log_martians", "1")],
    ),
    (
        "Enable source address verification?",
        &[
            ("net.ipv4.conf.all.rp_filter", "1"),
            ("net.ipv4.conf.default.rp_filter", "1"),
        ],
    ),
    (
        "Ignore ICMP redirects?",
        &[
            ("net.ipv4.conf.all.accept_redirects", "0"),
            ("net.ipv4.conf.default.accept_redirects", "0"),
        ],
    ),
    (
        "Disable IPv6?",
        &[
            ("net.ipv6.conf.all.disable_ipv6", "1"),
            ("net.ipv6.conf.default.disable_ipv6", "1"),
        ],
    ),
];

/// Enable the host firewall and tighten network kernel parameters.
#[derive(Debug)]
pub struct NetworkSetup;

impl NetworkSetup {
    fn run_linux(ctx: &Context) -> Result<()> {
        run_steps(
            ctx,
            &[
                CommandStep::new("Installing UFW", "apt", &["install", "-y", "ufw"]).ignore_err(),
                CommandStep::new("Enabling UFW", "ufw", &["enable"]),
                CommandStep::new("Allowing SSH through the firewall", "ufw", &["allow", "openssh"]),
                CommandStep::new("Denying incoming traffic by default", "ufw", &["default", "deny", "incoming"]),
                CommandStep::new("Allowing outgoing traffic by default", "ufw", &["default", "allow", "outgoing"]),
            ],
        )?;

        let mut desired = DirectiveSet::new();
        for (question, directives) in SYSCTL_PROMPTS {
            if ctx.prompter.confirm(question)? {
                desired.extend(
                    directives
                        .iter()
                        .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
                );
            }
        }
        if desired.is_empty() {
            ctx.log.info("no network parameters selected");
            return Ok(());
        }

        patch_file(ctx, &ctx.config.paths.sysctl, " = ", desired)?;
        ctx.log
            .warn("for changes to be applied, please restart the machine");
        Ok(())
    }

    fn run_windows(ctx: &Context) -> Result<()> {
        let mut steps = vec![CommandStep::new(
            "Enabling Windows Firewall",
            "netsh",
            &["advfirewall", "set", "allprofiles", "state", "on"],
        )];
        if ctx
            .prompter
            .confirm("Disable inbound connections by default?")?
        {
            steps.push(CommandStep::new(
                "Blocking inbound connections",
                "netsh",
                &[
                    "advfirewall",
                    "set",
                    "allprofiles",
                    "firewallpolicy",
                    "blockinbound,allowoutbound",
                ],
            ));
        }
        run_steps(ctx, &steps)?;
        Ok(())
    }
}

impl Script for NetworkSetup {
    fn name(&self) -> &str {
        "netsetup"
    }

    fn description(&self) -> &str {
        "Enable the firewall and harden network parameters"
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
