use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use osharden_cli::cli::{Cli, Command};
use osharden_cli::{commands, logging, signal};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    let command = args.selected_command();
    let (name, scripts) = match &command {
        Command::Completions(opts) => {
            commands::completions::run(opts);
            return Ok(());
        }
        Command::Version => {
            commands::version::run();
            return Ok(());
        }
        Command::List(_) => ("list", Vec::new()),
        Command::Run(opts) => ("run", opts.names.clone()),
        Command::Interactive => ("interactive", Vec::new()),
    };

    logging::init_subscriber(args.global.verbose, name, &scripts);
    signal::install_handler()?;
    let log = Arc::new(logging::Logger::new(name));
    log.debug(&format!("osharden {}", commands::version::version()));

    match command {
        Command::List(opts) => commands::list::run(&args.global, &opts, &log),
        Command::Run(opts) => commands::run::run(&args.global, &opts, &log),
        Command::Interactive => commands::interactive::run(&args.global, &log),
        Command::Completions(_) | Command::Version => Ok(()),
    }
}
