//! Start command: opens a new running entry.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::Args;

use tl_core::Entry;
use tl_store::EntryStore;

use crate::commands::util::{format_local, join_text, parse_when};

#[derive(Debug, Args)]
pub struct StartArgs {
    /// What you are working on. `#tags` anywhere in the text are picked up.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// When the work started (default: now).
    ///
    /// Accepts RFC 3339, a local date-time, HH:MM today, or "N minutes/hours ago".
    #[arg(long, value_name = "WHEN")]
    pub at: Option<String>,
}

pub fn run<W, Tz>(writer: &mut W, args: &StartArgs, store: &EntryStore, now: &DateTime<Tz>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let at = match &args.at {
        Some(when) => parse_when(when, now)?,
        None => now.with_timezone(&Utc),
    };
    let entry = store
        .start(&join_text(&args.text), at, now.with_timezone(&Utc))
        .context("failed to start entry")?;
    write_started(writer, &entry, &now.timezone())
}

/// Prints the confirmation line for a newly started entry.
pub(crate) fn write_started<W, Tz>(writer: &mut W, entry: &Entry, tz: &Tz) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    writeln!(
        writer,
        "Started: {} @ {}",
        entry.text,
        format_local(entry.start, tz, "%Y-%m-%d %H:%M")
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::FixedOffset;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 6, 11, 0, 0)
            .unwrap()
    }

    fn args(text: &str, at: Option<&str>) -> StartArgs {
        StartArgs {
            text: text.split(' ').map(String::from).collect(),
            at: at.map(String::from),
        }
    }

    #[test]
    fn start_writes_open_entry_and_confirms() {
        let temp = tempfile::tempdir().unwrap();
        let store = EntryStore::new(temp.path().join("log.txt"));

        let mut output = Vec::new();
        run(&mut output, &args("Review PR #code", None), &store, &now()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "Started: Review PR #code @ 2025-01-06 11:00\n");

        let running = store.open_entry().unwrap().unwrap();
        assert_eq!(running.start, Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap());
        assert_eq!(running.text, "Review PR #code");
    }

    #[test]
    fn start_at_earlier_time_of_day() {
        let temp = tempfile::tempdir().unwrap();
        let store = EntryStore::new(temp.path().join("log.txt"));

        let mut output = Vec::new();
        run(&mut output, &args("standup", Some("09:30")), &store, &now()).unwrap();

        let running = store.open_entry().unwrap().unwrap();
        assert_eq!(running.start, Utc.with_ymd_and_hms(2025, 1, 6, 8, 30, 0).unwrap());
    }

    #[test]
    fn start_refuses_second_running_entry() {
        let temp = tempfile::tempdir().unwrap();
        let store = EntryStore::new(temp.path().join("log.txt"));

        let mut output = Vec::new();
        run(&mut output, &args("first", None), &store, &now()).unwrap();
        let err = run(&mut output, &args("second", None), &store, &now()).unwrap_err();

        assert!(format!("{err:#}").contains("already running"));
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
