use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Top-level CLI entry point for the hardening assistant.
#[derive(Parser, Debug)]
#[command(
    name = "osharden",
    about = "Interactive, OS-aware system hardening assistant",
    version
)]
pub struct Cli {
    /// Subcommand to run; defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The chosen subcommand, falling back to the interactive menu.
    #[must_use]
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Interactive)
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalOpts {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Configuration file (defaults to $OSHARDEN_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not back up files before patching them
    #[arg(long = "no-backup", global = true, action = clap::ArgAction::SetFalse)]
    pub backup: bool,

    /// Run even without root / Administrator privileges
    #[arg(long, global = true)]
    pub allow_unprivileged: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List scripts available on this system
    List(ListOpts),
    /// Run the named scripts in order
    Run(RunOpts),
    /// Pick scripts from a menu until you quit
    Interactive,
    /// Print shell completions
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

/// Options for the `list` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ListOpts {
    /// Include scripts for other operating systems
    #[arg(long)]
    pub all: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Options for the `run` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RunOpts {
    /// Script names, run in the order given
    #[arg(required = true, value_name = "SCRIPT")]
    pub names: Vec<String>,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
