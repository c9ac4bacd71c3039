//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::add::AddArgs;
use crate::commands::log::LogArgs;
use crate::commands::report::ReportArgs;
use crate::commands::start::StartArgs;
use crate::commands::status::StatusArgs;
use crate::commands::stop::StopArgs;

/// Plain-text time log.
///
/// Start and stop work, record past intervals, and report time per #tag. Entries are kept
/// in a single human-editable text file.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new running entry.
    Start(StartArgs),

    /// Stop the running entry.
    Stop(StopArgs),

    /// Record a finished entry.
    Add(AddArgs),

    /// Quick entry: text with optional @HH:MM start and end times.
    Log(LogArgs),

    /// Show the running entry and today's and this week's totals.
    Status(StatusArgs),

    /// Summarize logged time by tag.
    Report(ReportArgs),

    /// List every tag used in the log.
    Tags,
}
