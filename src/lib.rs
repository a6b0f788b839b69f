//! OS-aware system hardening assistant.
//!
//! Walks an operator through hardening a Linux or Windows host: kernel and
//! network parameters, firewall, password policy, services, accounts,
//! packages, name resolution and malware scans.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: tool configuration loaded from TOML
//! - **[`resources`]**: idempotent `check + apply` primitives, chiefly the
//!   directive patcher for line-oriented configuration files
//! - **[`scripts`]**: named, OS-aware units of work and the registry that
//!   dispatches them
//! - **[`commands`]**: top-level subcommand orchestration (`list`, `run`,
//!   `interactive`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod prompt;
pub mod resources;
pub mod scripts;
pub mod signal;
