//! Add command: records a finished entry after the fact.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::Args;

use tl_core::Entry;
use tl_store::{EntryStore, StoreError};

use crate::commands::util::{format_duration, format_local, join_text, parse_when};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// When the work started.
    #[arg(long, value_name = "WHEN")]
    pub start: String,

    /// When the work ended.
    #[arg(long, value_name = "WHEN")]
    pub end: String,

    /// Description of the work, with optional `#tags`.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

pub fn run<W, Tz>(writer: &mut W, args: &AddArgs, store: &EntryStore, now: &DateTime<Tz>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let start = parse_when(&args.start, now).context("invalid --start")?;
    let end = parse_when(&args.end, now).context("invalid --end")?;
    add_entry(writer, store, start, end, &join_text(&args.text), now)
}

/// Adds a closed entry and prints the confirmation.
///
/// Overlaps are reported in local time.
pub(crate) fn add_entry<W, Tz>(
    writer: &mut W,
    store: &EntryStore,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    text: &str,
    now: &DateTime<Tz>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let entry = match store.add(start, end, text, now.with_timezone(&Utc)) {
        Ok(entry) => entry,
        Err(StoreError::Overlap { existing, overlap }) => anyhow::bail!(
            "New entry overlaps with existing entry '{}' starting at {} for {}.",
            existing.text,
            format_local(existing.start, &tz, "%Y-%m-%d %H:%M"),
            format_duration(overlap)
        ),
        Err(e) => return Err(e).context("failed to add entry"),
    };
    write_added(writer, &entry, &tz)
}

fn write_added<W, Tz>(writer: &mut W, entry: &Entry, tz: &Tz) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let end = entry.end.unwrap_or(entry.start);
    writeln!(
        writer,
        "Added {} entry {} -> {} : {}",
        format_duration(end - entry.start),
        format_local(entry.start, tz, "%Y-%m-%d %H:%M"),
        format_local(end, tz, "%H:%M"),
        entry.text
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 14, 0, 0).unwrap()
    }

    fn args(start: &str, end: &str, text: &str) -> AddArgs {
        AddArgs {
            start: start.to_string(),
            end: end.to_string(),
            text: vec![text.to_string()],
        }
    }

    #[test]
    fn add_records_closed_entry() {
        let temp = tempfile::tempdir().unwrap();
        let store = EntryStore::new(temp.path().join("log.txt"));

        let mut output = Vec::new();
        run(&mut output, &args("09:00", "10:30", "Write docs #project"), &store, &now()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "Added 1h30m entry 2025-01-06 09:00 -> 10:30 : Write docs #project\n"
        );
        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_open());
    }

    #[test]
    fn add_reports_overlap_in_local_time() {
        let temp = tempfile::tempdir().unwrap();
        let store = EntryStore::new(temp.path().join("log.txt"));

        let mut output = Vec::new();
        run(&mut output, &args("09:30", "10:30", "existing"), &store, &now()).unwrap();
        let err = run(&mut output, &args("09:00", "10:00", "new"), &store, &now()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "New entry overlaps with existing entry 'existing' starting at 2025-01-06 09:30 for 0h30m."
        );
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn add_rejects_reversed_range() {
        let temp = tempfile::tempdir().unwrap();
        let store = EntryStore::new(temp.path().join("log.txt"));

        let mut output = Vec::new();
        let err = run(&mut output, &args("10:00", "09:00", "backwards"), &store, &now()).unwrap_err();

        assert!(format!("{err:#}").contains("failed to add entry"));
        assert!(store.load().unwrap().is_empty());
    }
}
