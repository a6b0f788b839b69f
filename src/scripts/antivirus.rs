use anyhow::Result;

use super::helpers::{CommandStep, run_step, run_steps};
use super::{Context, Script};
use crate::platform::Os;

/// Defender scan types offered on Windows.
const SCAN_TYPES: [&str; 3] = ["QuickScan", "FullScan", "CustomScan"];

/// Run a full antivirus scan.
#[derive(Debug)]
pub struct RunAntivirus;

impl Script for RunAntivirus {
    fn name(&self) -> &str {
        "runav"
    }

    fn description(&self) -> &str {
        "Run an antivirus scan"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux, Os::Windows]
    }

    fn run(&self, os: Os, ctx: &Context) -> Result<()> {
        match os {
            Os::Linux => {
                run_steps(
                    ctx,
                    &[
                        CommandStep::new("Installing ClamAV", "apt", &["install", "-y", "clamav"]),
                        CommandStep::new("Updating virus definitions", "freshclam", &[])
                            .ignore_err(),
                        CommandStep::new("Scanning the filesystem", "clamscan", &["-r", "/"]),
                    ],
                )?;
            }
            Os::Windows => {
                let items: Vec<String> = ["Quick", "Full", "Custom"].map(String::from).to_vec();
                let Some(scan) = ctx
                    .prompter
                    .select("Which scan should Windows Defender run?", &items)?
                    .and_then(|i| SCAN_TYPES.get(i))
                else {
                    ctx.log.info("scan cancelled");
                    return Ok(());
                };
                let command = format!("Start-MpScan -ScanType {scan}");
                run_step(
                    ctx,
                    &CommandStep::new(
                        "Running Windows Defender scan",
                        "powershell.exe",
                        &["-Command", command.as_str()],
                    ),
                )?;
            }
        }
        Ok(())
    }
}
