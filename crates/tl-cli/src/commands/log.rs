//! Log command: quick entry with inline `@HH:MM` times.
//!
//! `tl log fix login bug #auth` starts now, `tl log @9:15 standup` starts at 9:15 today, and
//! `tl log @9:00 @10:30 Write docs #project` records a finished entry.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::Args;

use tl_core::parse_quick_entry;
use tl_store::EntryStore;

use crate::commands::add::add_entry;
use crate::commands::start::write_started;
use crate::commands::util::join_text;

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Description with up to two `@HH:MM` tokens (start, then end).
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

pub fn run<W, Tz>(writer: &mut W, args: &LogArgs, store: &EntryStore, now: &DateTime<Tz>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let now_utc = now.with_timezone(&Utc);
    let quick = parse_quick_entry(&join_text(&args.text), now)?;
    tracing::debug!(?quick, "parsed quick entry");

    match (quick.start, quick.end) {
        (Some(start), Some(end)) => add_entry(writer, store, start, end, &quick.text, now),
        (start, _) => {
            let entry = store
                .start(&quick.text, start.unwrap_or(now_utc), now_utc)
                .context("failed to start entry")?;
            write_started(writer, &entry, &now.timezone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 14, 0, 0).unwrap()
    }

    fn args(raw: &str) -> LogArgs {
        LogArgs {
            text: raw.split(' ').map(String::from).collect(),
        }
    }

    fn store() -> (tempfile::TempDir, EntryStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = EntryStore::new(temp.path().join("log.txt"));
        (temp, store)
    }

    #[test]
    fn plain_text_starts_now() {
        let (_temp, store) = store();
        let mut output = Vec::new();
        run(&mut output, &args("fix login bug #auth"), &store, &now()).unwrap();

        let running = store.open_entry().unwrap().unwrap();
        assert_eq!(running.start, now());
        assert_eq!(running.text, "fix login bug #auth");
    }

    #[test]
    fn one_time_starts_at_that_time() {
        let (_temp, store) = store();
        let mut output = Vec::new();
        run(&mut output, &args("@9:15 standup"), &store, &now()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output, "Started: standup @ 2025-01-06 09:15\n");
    }

    #[test]
    fn two_times_add_finished_entry() {
        let (_temp, store) = store();
        let mut output = Vec::new();
        run(&mut output, &args("@9:00 Write docs @10:30 #project"), &store, &now()).unwrap();

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "Write docs #project");
        assert_eq!(
            entries[0].end,
            Some(Utc.with_ymd_and_hms(2025, 1, 6, 10, 30, 0).unwrap())
        );
        assert!(store.open_entry().unwrap().is_none());
    }

    #[test]
    fn three_times_is_an_error() {
        let (_temp, store) = store();
        let mut output = Vec::new();
        assert!(run(&mut output, &args("@9:00 @10:00 @11:00 too many"), &store, &now()).is_err());
        assert!(store.load().unwrap().is_empty());
    }
}
