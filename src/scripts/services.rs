use anyhow::Result;

use super::helpers::{CommandStep, patch_file, run_step, run_steps};
use super::{Context, Script};
use crate::platform::Os;
use crate::resources::directives::DirectiveSet;

/// Configure the SSH and FTP daemons.
#[derive(Debug)]
pub struct ServiceConfiguration;

fn yes_no(ctx: &Context, question: &str, yes: &str, no: &str) -> Result<String> {
    Ok(if ctx.prompter.confirm(question)? { yes } else { no }.to_string())
}

/// Enable and start `service`, or stop and disable it.
///
/// Returns whether the service should be configured further.
fn init_service(ctx: &Context, service: &str) -> Result<bool> {
    if !ctx
        .prompter
        .confirm(&format!("Should {service} be enabled on this machine?"))?
    {
        ctx.log.warn(&format!("disabling {service}"));
        run_steps(
            ctx,
            &[
                CommandStep::new(&format!("Stopping {service}"), "systemctl", &["stop", service]).ignore_err(),
                CommandStep::new(&format!("Disabling {service}"), "systemctl", &["disable", service]).ignore_err(),
            ],
        )?;
        return Ok(false);
    }

    run_step(
        ctx,
        &CommandStep::new(&format!("Enabling {service}"), "systemctl", &["enable", service]),
    )?;
    if ctx.dry_run {
        ctx.log.dry_run(&format!("would start {service} if it is not running"));
        return Ok(true);
    }
    let status = ctx
        .executor
        .run_unchecked("systemctl", &["status", service])?;
    if status.stdout.contains("active (running)") {
        ctx.log.debug(&format!("{service} is already running"));
    } else {
        run_step(
            ctx,
            &CommandStep::new(&format!("Starting {service}"), "systemctl", &["start", service]),
        )?;
    }
    Ok(true)
}

impl ServiceConfiguration {
    fn configure_ssh(ctx: &Context) -> Result<()> {
        if !init_service(ctx, "ssh")? {
            return Ok(());
        }
        run_step(
            ctx,
            &CommandStep::new("Allowing SSH through the firewall", "ufw", &["allow", "openssh"]),
        )?;

        let mut desired = DirectiveSet::new();
        desired.insert(
            "PermitRootLogin".to_string(),
            yes_no(ctx, "Allow root login over SSH?", "yes", "no")?,
        );
        desired.insert(
            "PasswordAuthentication".to_string(),
            yes_no(ctx, "Allow password authentication over SSH?", "yes", "no")?,
        );
        let port = ctx
            .prompter
            .input("What port should SSH listen on? (default is 22)")?;
        if !port.trim().is_empty() {
            desired.insert("Port".to_string(), port.trim().to_string());
        }

        patch_file(ctx, &ctx.config.paths.sshd_config, " ", desired)?;

        if ctx.prompter.confirm("Restart the SSH daemon now?")? {
            run_step(
                ctx,
                &CommandStep::new("Restarting sshd", "systemctl", &["restart", "sshd"]),
            )?;
        }
        Ok(())
    }

    fn configure_ftp(ctx: &Context) -> Result<()> {
        if !init_service(ctx, "vsftpd")? {
            return Ok(());
        }
        run_step(
            ctx,
            &CommandStep::new("Allowing FTP through the firewall", "ufw", &["allow", "vsftpd"]),
        )?;

        let mut desired = DirectiveSet::new();
        desired.insert(
            "anonymous_enable".to_string(),
            yes_no(ctx, "Allow anonymous FTP logins?", "YES", "NO")?,
        );
        let tls = ctx.prompter.confirm("Require TLS for FTP connections?")?;
        let (on, off) = if tls { ("YES", "NO") } else { ("NO", "YES") };
        desired.insert("ssl_enable".to_string(), on.to_string());
        desired.insert("ssl_tlsv1".to_string(), on.to_string());
        desired.insert("ssl_sslv2".to_string(), off.to_string());
        desired.insert("ssl_sslv3".to_string(), off.to_string());
        desired.insert(
            "allow_anon_ssl".to_string(),
            yes_no(ctx, "Allow anonymous users to use TLS?", "YES", "NO")?,
        );

        if ctx.prompter.confirm("Restrict passive mode to a port range?")? {
            let min = ctx.prompter.input("Minimum passive port?")?;
            let max = ctx.prompter.input("Maximum passive port?")?;
            let (min, max) = (min.trim(), max.trim());
            desired.insert("pasv_min_port".to_string(), min.to_string());
            desired.insert("pasv_max_port".to_string(), max.to_string());
            let range = format!("{min}:{max}/tcp");
            run_step(
                ctx,
                &CommandStep::new("Allowing passive FTP ports", "ufw", &["allow", range.as_str()]),
            )?;
        }

        patch_file(ctx, &ctx.config.paths.vsftpd, "=", desired)?;
        Ok(())
    }
}

impl Script for ServiceConfiguration {
    fn name(&self) -> &str {
        "service-config"
    }

    fn description(&self) -> &str {
        "Configure the SSH and FTP services"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux]
    }

    fn run(&self, _os: Os, ctx: &Context) -> Result<()> {
        if ctx.prompter.confirm("Configure SSH?")? {
            Self::configure_ssh(ctx)?;
        }
        if ctx.prompter.confirm("Configure FTP?")? {
            Self::configure_ftp(ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::prompt::test_helpers::Answer;
    use crate::scripts::test_helpers::Fixture;
    use std::fs;

    fn text(s: &str) -> Answer {
        Answer::Text(s.to_string())
    }

    #[test]
    fn ssh_is_enabled_started_and_patched() {
        let fx = Fixture::new(Os::Linux)
            .answers(vec![
                Answer::Yes,
                Answer::Yes,
                Answer::No,
                Answer::No,
                text("2222"),
                Answer::Yes,
                Answer::No,
            ])
            .build();
        let path = &fx.ctx.config.paths.sshd_config;
        fs::write(path, "#PermitRootLogin prohibit-password\n#Port 22\nUsePAM yes\n").unwrap();

        ServiceConfiguration.run(Os::Linux, &fx.ctx).unwrap();

        assert_eq!(
            fx.executor.calls(),
            vec![
                "systemctl enable ssh",
                "systemctl status ssh",
                "systemctl start ssh",
                "ufw allow openssh",
                "systemctl restart sshd",
            ]
        );
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "PermitRootLogin no\nPort 2222\nUsePAM yes\nPasswordAuthentication no\n"
        );
    }

    #[test]
    fn running_service_is_not_started_again() {
        let fx = Fixture::new(Os::Linux)
            .responses(vec![
                (true, String::new()),
                (true, "   Active: active (running) since Mon".to_string()),
            ])
            .answers(vec![
                Answer::Yes,
                Answer::Yes,
                Answer::Yes,
                Answer::Yes,
                text(""),
                Answer::No,
                Answer::No,
            ])
            .build();
        let path = &fx.ctx.config.paths.sshd_config;
        fs::write(path, "").unwrap();

        ServiceConfiguration.run(Os::Linux, &fx.ctx).unwrap();

        assert!(!fx.executor.calls().contains(&"systemctl start ssh".to_string()));
        let content = fs::read_to_string(path).unwrap();
        assert!(!content.contains("Port"));
        assert!(content.contains("PermitRootLogin yes\n"));
    }

    #[test]
    fn declined_service_is_stopped_and_disabled() {
        let fx = Fixture::new(Os::Linux)
            .responses(vec![(false, String::new())])
            .answers(vec![Answer::No, Answer::Yes, Answer::No])
            .build();
        ServiceConfiguration.run(Os::Linux, &fx.ctx).unwrap();
        assert_eq!(
            fx.executor.calls(),
            vec!["systemctl stop vsftpd", "systemctl disable vsftpd"]
        );
        assert_eq!(fx.prompter.remaining(), 0);
    }

    #[test]
    fn ftp_with_tls_and_passive_range() {
        let fx = Fixture::new(Os::Linux)
            .answers(vec![
                Answer::No,
                Answer::Yes,
                Answer::Yes,
                Answer::No,
                Answer::Yes,
                Answer::No,
                Answer::Yes,
                text("40000"),
                text("40100"),
            ])
            .build();
        let path = &fx.ctx.config.paths.vsftpd;
        fs::write(path, "anonymous_enable=YES\n#ssl_enable=NO\n").unwrap();

        ServiceConfiguration.run(Os::Linux, &fx.ctx).unwrap();

        assert!(
            fx.executor
                .calls()
                .contains(&"ufw allow 40000:40100/tcp".to_string())
        );
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "anonymous_enable=NO\nssl_enable=YES\nallow_anon_ssl=NO\npasv_max_port=40100\npasv_min_port=40000\nssl_sslv2=NO\nssl_sslv3=NO\nssl_tlsv1=YES\n"
        );
    }
}
