use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{Local, SubsecRound};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tl_cli::commands::{add, log, report, start, status, stop, tags};
use tl_cli::{Cli, Commands, Config};
use tl_store::EntryStore;

/// Load config and open the log, ensuring the parent directory exists.
fn open_store(config_path: Option<&std::path::Path>) -> Result<EntryStore> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create log directory")?;
    }

    Ok(EntryStore::new(config.log_path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let store = open_store(cli.config.as_deref())?;
    let now = Local::now().trunc_subsecs(0);
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Start(args) => start::run(&mut stdout, args, &store, &now)?,
        Commands::Stop(args) => stop::run(&mut stdout, args, &store, &now)?,
        Commands::Add(args) => add::run(&mut stdout, args, &store, &now)?,
        Commands::Log(args) => log::run(&mut stdout, args, &store, &now)?,
        Commands::Status(args) => status::run(&mut stdout, args, &store, &now)?,
        Commands::Report(args) => report::run(&mut stdout, args, &store, &now)?,
        Commands::Tags => tags::run(&mut stdout, &store)?,
    }

    stdout.flush()?;
    Ok(())
}
