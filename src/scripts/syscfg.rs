use anyhow::Result;

use super::helpers::patch_file;
use super::{Context, Script};
use crate::platform::Os;
use crate::resources::directives::{DirectiveSet, directive_set};

/// Kernel parameters applied on every run.
const KERNEL_DIRECTIVES: [(&str, &str); 3] = [
    ("fs.suid_dumpable", "0"),
    ("kernel.randomize_va_space", "2"),
    ("kernel.exec-shield", "1"),
];

/// Harden kernel parameters in sysctl.conf.
#[derive(Debug)]
pub struct SystemConfiguration;

impl SystemConfiguration {
    /// Built-in directives overlaid with any configured `sysctl` entries.
    fn directives(ctx: &Context) -> DirectiveSet {
        let mut desired = directive_set(KERNEL_DIRECTIVES);
        desired.extend(
            ctx.config
                .sysctl
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        desired
    }
}

impl Script for SystemConfiguration {
    fn name(&self) -> &str {
        "syscfg"
    }

    fn description(&self) -> &str {
        "Harden kernel parameters in sysctl.conf"
    }

    fn supported_os(&self) -> &[Os] {
        &[Os::Linux]
    }

    fn run(&self, _os: Os, ctx: &Context) -> Result<()> {
        let desired = Self::directives(ctx);
        patch_file(ctx, &ctx.config.paths.sysctl, " = ", desired)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::scripts::test_helpers::Fixture;
    use std::fs;

    #[test]
    fn patches_existing_and_appends_missing() {
        let fx = Fixture::new(Os::Linux).build();
        let path = &fx.ctx.config.paths.sysctl;
        fs::write(path, "# kernel.exec-shield = 0\nvm.swappiness = 10\n").unwrap();

        SystemConfiguration.run(Os::Linux, &fx.ctx).unwrap();

        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "kernel.exec-shield = 1\nvm.swappiness = 10\nfs.suid_dumpable = 0\nkernel.randomize_va_space = 2\n"
        );
    }

    #[test]
    fn second_run_changes_nothing() {
        let fx = Fixture::new(Os::Linux).build();
        let path = &fx.ctx.config.paths.sysctl;
        fs::write(path, "").unwrap();
        SystemConfiguration.run(Os::Linux, &fx.ctx).unwrap();
        let first = fs::read_to_string(path).unwrap();
        SystemConfiguration.run(Os::Linux, &fx.ctx).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), first);
    }

    #[test]
    fn configured_overrides_win() {
        let mut config = Config::default();
        config
            .sysctl
            .insert("kernel.randomize_va_space".to_string(), "1".to_string());
        config
            .sysctl
            .insert("kernel.kptr_restrict".to_string(), "2".to_string());
        let fx = Fixture::new(Os::Linux).config(config).build();
        let path = &fx.ctx.config.paths.sysctl;
        fs::write(path, "").unwrap();

        SystemConfiguration.run(Os::Linux, &fx.ctx).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("kernel.randomize_va_space = 1\n"));
        assert!(content.contains("kernel.kptr_restrict = 2\n"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let fx = Fixture::new(Os::Linux).build();
        assert!(SystemConfiguration.run(Os::Linux, &fx.ctx).is_err());
    }
}
