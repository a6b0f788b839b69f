//! Named hardening scripts and the registry that dispatches them.
pub mod antivirus;
pub mod context;
pub mod dns;
pub mod helpers;
pub mod hosts;
pub mod media;
pub mod netapps;
pub mod netsetup;
pub mod password;
pub mod programs;
pub mod services;
pub mod syscfg;
pub mod users;

pub use context::Context;

use std::collections::BTreeMap;

use anyhow::Result;

use crate::error::DispatchError;
use crate::logging::ScriptStatus;
use crate::platform::Os;

/// A named, OS-aware unit of hardening work.
///
/// Each script declares the operating systems it supports as data; the
/// registry refuses to run it anywhere else.
pub trait Script: Send + Sync {
    /// Unique name used to look the script up.
    fn name(&self) -> &str;

    /// One-line human-readable description.
    fn description(&self) -> &str;

    /// Operating systems this script can run on.
    fn supported_os(&self) -> &[Os];

    /// Execute the script for `os`.
    ///
    /// Only called by [`ScriptRegistry::dispatch`] after checking that `os`
    /// is in [`supported_os`](Self::supported_os).
    ///
    /// # Errors
    ///
    /// Returns an error if a command fails, a file cannot be patched, or the
    /// user's answers cannot be read.
    fn run(&self, os: Os, ctx: &Context) -> Result<()>;

    /// Whether this script declares support for `os`.
    fn supports(&self, os: Os) -> bool {
        self.supported_os().contains(&os)
    }
}

impl std::fmt::Debug for dyn Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Script")
            .field("name", &self.name())
            .field("supported_os", &self.supported_os())
            .finish()
    }
}

/// The complete set of scripts shipped with the tool.
#[must_use]
pub fn all_scripts() -> Vec<Box<dyn Script>> {
    vec![
        Box::new(syscfg::SystemConfiguration),
        Box::new(netsetup::NetworkSetup),
        Box::new(password::PasswordSetup),
        Box::new(services::ServiceConfiguration),
        Box::new(users::AllowedUsers),
        Box::new(programs::RemovePrograms),
        Box::new(programs::UpdatePrograms),
        Box::new(hosts::VerifyHosts),
        Box::new(dns::UpdateDns),
        Box::new(netapps::NetworkApps),
        Box::new(antivirus::RunAntivirus),
        Box::new(media::MediaSearch),
    ]
}

/// Name-keyed collection of scripts.
///
/// Populated once at startup and read-only while scripts are dispatched.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    scripts: BTreeMap<String, Box<dyn Script>>,
}

impl ScriptRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding [`all_scripts`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for script in all_scripts() {
            registry.register(script);
        }
        registry
    }

    /// Register `script` under its own name, replacing any script already
    /// registered under that name.  Returns the replaced script.
    pub fn register(&mut self, script: Box<dyn Script>) -> Option<Box<dyn Script>> {
        self.scripts.insert(script.name().to_string(), script)
    }

    /// Remove the script registered under `name`, if any.
    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn Script>> {
        self.scripts.remove(name)
    }

    /// Find a script by exact name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&dyn Script> {
        self.scripts.get(name).map(AsRef::as_ref)
    }

    /// All registered scripts, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Script> {
        self.scripts.values().map(AsRef::as_ref)
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }

    /// Scripts that declare support for `os`, keyed by name.
    #[must_use]
    pub fn list_supported(&self, os: Os) -> BTreeMap<&str, &dyn Script> {
        self.scripts
            .iter()
            .filter(|(_, script)| script.supports(os))
            .map(|(name, script)| (name.as_str(), script.as_ref()))
            .collect()
    }

    /// Run `script` for `os`.
    ///
    /// Nothing runs when `os` is not in the script's declared set.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnsupportedOnOs`] for an unsupported OS and
    /// [`DispatchError::Failed`] carrying the script's own error otherwise.
    pub fn dispatch(script: &dyn Script, os: Os, ctx: &Context) -> Result<(), DispatchError> {
        if !script.supports(os) {
            return Err(DispatchError::UnsupportedOnOs {
                script: script.name().to_string(),
                os,
            });
        }
        script.run(os, ctx).map_err(|e| DispatchError::Failed {
            script: script.name().to_string(),
            source: e.into(),
        })
    }

    /// Dispatch `script` for the context's platform and record the outcome
    /// in the run summary.
    #[must_use]
    pub fn execute(script: &dyn Script, ctx: &Context) -> ScriptStatus {
        let name = script.name();
        let _span = crate::logging::script_span(name).entered();
        ctx.log.stage(name);

        let status = match Self::dispatch(script, ctx.platform.os, ctx) {
            Ok(()) if ctx.dry_run => ScriptStatus::DryRun,
            Ok(()) => ScriptStatus::Succeeded,
            Err(e @ DispatchError::UnsupportedOnOs { .. }) => {
                ctx.log.warn(&e.to_string());
                ctx.log
                    .record_script(name, ScriptStatus::Unsupported, Some(&e.to_string()));
                return ScriptStatus::Unsupported;
            }
            Err(DispatchError::Failed { source, .. }) => {
                ctx.log.error(&format!("{name}: {source}"));
                ctx.log
                    .record_script(name, ScriptStatus::Failed, Some(&source.to_string()));
                return ScriptStatus::Failed;
            }
        };
        ctx.log.record_script(name, status, None);
        status
    }
}
