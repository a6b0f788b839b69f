//! Command: list scripts.
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ListOpts};
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::platform::Os;
use crate::scripts::ScriptRegistry;

/// One row of the script listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptInfo {
    /// Registered name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Operating systems the script runs on.
    pub supported_os: Vec<Os>,
}

/// Scripts applicable to `os`, or every script when `all` is set.
#[must_use]
pub fn entries(registry: &ScriptRegistry, os: Os, all: bool) -> Vec<ScriptInfo> {
    registry
        .iter()
        .filter(|script| all || script.supports(os))
        .map(|script| ScriptInfo {
            name: script.name().to_string(),
            description: script.description().to_string(),
            supported_os: script.supported_os().to_vec(),
        })
        .collect()
}

/// Render `entries` as an aligned plain-text table.
#[must_use]
pub fn render_table(entries: &[ScriptInfo]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|e| {
            let os: Vec<String> = e.supported_os.iter().map(ToString::to_string).collect();
            format!(
                "{:<width$}  {:<13}  {}\n",
                e.name,
                os.join(","),
                e.description
            )
        })
        .collect()
}

/// Run the `list` command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or JSON
/// serialization fails.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &ListOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log, &SystemExecutor)?;
    let rows = entries(&setup.registry, setup.platform.os, opts.all);
    if opts.json {
        let json = serde_json::to_string_pretty(&rows).context("serializing script list")?;
        println!("{json}");
    } else {
        print!("{}", render_table(&rows));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn host_listing_excludes_other_os() {
        let registry = ScriptRegistry::with_defaults();
        let windows = entries(&registry, Os::Windows, false);
        assert!(windows.iter().all(|e| e.supported_os.contains(&Os::Windows)));
        assert!(!windows.iter().any(|e| e.name == "syscfg"));
        assert_eq!(entries(&registry, Os::Windows, true).len(), registry.names().len());
    }

    #[test]
    fn table_aligns_columns() {
        let rows = vec![
            ScriptInfo {
                name: "runav".to_string(),
                description: "Run an antivirus scan".to_string(),
                supported_os: vec![Os::Linux, Os::Windows],
            },
            ScriptInfo {
                name: "syscfg".to_string(),
                description: "Harden kernel parameters".to_string(),
                supported_os: vec![Os::Linux],
            },
        ];
        assert_eq!(
            render_table(&rows),
            "runav   linux,windows  Run an antivirus scan\n\
             syscfg  linux          Harden kernel parameters\n"
        );
    }

    #[test]
    fn json_uses_lowercase_os_names() {
        let rows = vec![ScriptInfo {
            name: "runav".to_string(),
            description: "scan".to_string(),
            supported_os: vec![Os::Windows],
        }];
        let json: serde_json::Value = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["supported_os"][0], "windows");
    }
}
