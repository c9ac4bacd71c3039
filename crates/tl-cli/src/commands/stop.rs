//! Stop command: closes the running entry.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::Args;

use tl_store::EntryStore;

use crate::commands::util::{format_duration, format_local, parse_when};

#[derive(Debug, Args)]
pub struct StopArgs {
    /// When the work ended (default: now). Same formats as `start --at`.
    #[arg(long, value_name = "WHEN")]
    pub at: Option<String>,
}

pub fn run<W, Tz>(writer: &mut W, args: &StopArgs, store: &EntryStore, now: &DateTime<Tz>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let now_utc = now.with_timezone(&Utc);
    let at = match &args.at {
        Some(when) => parse_when(when, now)?,
        None => now_utc,
    };
    let stopped = store.stop(at, now_utc).context("failed to stop entry")?;

    writeln!(
        writer,
        "Stopped '{}' after {}.",
        stopped.text,
        format_duration(stopped.duration(now_utc))
    )?;
    if let Some(end) = stopped.end.filter(|end| *end != at) {
        writeln!(
            writer,
            "Stop time moved to {}, one minute after the start.",
            format_local(end, &now.timezone(), "%H:%M")
        )?;
    }
    Ok(())
}
