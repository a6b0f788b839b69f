use anyhow::Result;

use super::helpers::{CommandStep, patch_file, run_steps};
use super::{Context, Script};
use crate::platform::Os;
use crate::resources::directives::DirectiveSet;

/// Account policy applied with `net accounts` on Windows.
const WINDOWS_POLICY: [(&str, &str); 6] = [
    ("Setting minimum password length", "/minpwlen:8"),
    ("Setting maximum password age", "/maxpwage:90"),
    ("Setting minimum password age", "/minpwage:10"),
    ("Setting password history", "/uniquepw:5"),
    ("Setting lockout threshold", "/lockoutthreshold:5"),
    ("Setting lockout duration", "/lockoutduration:30"),
];

/// Configure password ageing, hashing and quality requirements.
#[derive(Debug)]
pub struct PasswordSetup;

/// Ask for a value, offering `default` for an empty answer.
fn ask(ctx: &Context, set: &mut DirectiveSet, key: &str, question: &str, default: &str) -> Result<()> {
    let value = ctx.prompter.input_with_default(question, default)?;
    set.insert(key.to_string(), value);
    Ok(())
}

/// `yes` when the user agrees, otherwise `no`.
fn flag(ctx: &Context, question: &str, yes: &str, no: &str) -> Result<String> {
    Ok(if ctx.prompter.confirm(question)? { yes } else { no }.to_string())
}

impl PasswordSetup {
    fn run_linux(ctx: &Context) -> Result<()> {
        let defaults = &ctx.config.password;

        let mut login_defs = DirectiveSet::new();
        ask(ctx, &mut login_defs, "PASS_MIN_DAYS", "Minimum days between password changes?", &defaults.min_days.to_string())?;
        ask(ctx, &mut login_defs, "PASS_MAX_DAYS", "Maximum days a password may be used?", &defaults.max_days.to_string())?;
        ask(ctx, &mut login_defs, "ENCRYPT_METHOD", "Password hashing method?", &defaults.encrypt_method)?;
        ask(ctx, &mut login_defs, "LOGIN_RETRIES", "Login attempts before failure?", &defaults.login_retries.to_string())?;

        let mut pwquality = DirectiveSet::new();
        ask(ctx, &mut pwquality, "minlen", "Minimum password length?", &defaults.min_length.to_string())?;
        let credit = flag(
            ctx,
            "Require digits, upper case, lower case and symbols in passwords?",
            "-1",
            "0",
        )?;
        for key in ["dcredit", "ucredit", "lcredit", "ocredit"] {
            pwquality.insert(key.to_string(), credit.clone());
        }
        pwquality.insert(
            "dictcheck".to_string(),
            flag(ctx, "Reject passwords found in the dictionary?", "1", "0")?,
        );
        pwquality.insert(
            "usercheck".to_string(),
            flag(ctx, "Reject passwords containing the user name?", "1", "0")?,
        );

        patch_file(ctx, &ctx.config.paths.login_defs, " ", login_defs)?;
        patch_file(ctx, &ctx.config.paths.pwquality, " = ", pwquality)?;
        Ok(())
    }

    fn run_windows(ctx: &Context) -> Result<()> {
        let steps: Vec<CommandStep> = WINDOWS_POLICY
            .iter()
            .map(|(message, arg)| CommandStep::new(message, "net", &["accounts", arg]))
            .collect();
        run_steps(ctx, &steps)?;
        Ok(())
    }
}

impl Script for PasswordSetup {
    fn name(&self) -> &str {
        "pwd-setup"
    }

    fn description(&self) -> &str {
        "Configure password ageing and quality policy"
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
