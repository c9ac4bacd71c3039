//! Status command: the running entry and today's and this week's totals.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use clap::Args;
use serde::Serialize;

use tl_core::{Entry, ValidationError, aggregate, day_window, week_window};
use tl_store::{EntryStore, find_open};

use crate::commands::util::{format_duration, format_local};

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Computed status.
#[derive(Debug)]
pub struct StatusData {
    pub active: Option<ActiveEntry>,
    pub today: Duration,
    pub week: Duration,
}

/// The running entry with its elapsed time at the moment of the query.
#[derive(Debug)]
pub struct ActiveEntry {
    pub entry: Entry,
    pub elapsed: Duration,
}

pub fn compute_status<Tz: TimeZone>(
    entries: &[Entry],
    now: &DateTime<Tz>,
) -> Result<StatusData, ValidationError> {
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);

    let active = find_open(entries).map(|idx| {
        let entry = entries[idx].clone();
        let elapsed = entry.duration(now_utc);
        ActiveEntry { entry, elapsed }
    });

    Ok(StatusData {
        active,
        today: aggregate(entries, &day_window(now_utc, &tz)?, now_utc).total,
        week: aggregate(entries, &week_window(now_utc, &tz)?, now_utc).total,
    })
}

pub fn format_status<Tz>(data: &StatusData, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let active = data.active.as_ref().map_or_else(
        || "No active entry.".to_string(),
        |active| {
            format!(
                "Active: {} (since {}, {})",
                active.entry.text,
                format_local(active.entry.start, tz, "%H:%M"),
                format_duration(active.elapsed)
            )
        },
    );
    format!(
        "{active}\nToday:     {}\nThis week: {}\n",
        format_duration(data.today),
        format_duration(data.week)
    )
}

#[derive(Debug, Serialize)]
pub struct JsonStatus {
    pub active: Option<JsonActive>,
    pub today_minutes: i64,
    pub week_minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonActive {
    pub start: String,
    pub text: String,
    pub tags: Vec<String>,
    pub elapsed_minutes: i64,
}

pub fn format_status_json(data: &StatusData) -> Result<String> {
    let status = JsonStatus {
        active: data.active.as_ref().map(|active| JsonActive {
            start: active.entry.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            text: active.entry.text.clone(),
            tags: active.entry.tags(),
            elapsed_minutes: active.elapsed.num_minutes(),
        }),
        today_minutes: data.today.num_minutes(),
        week_minutes: data.week.num_minutes(),
    };
    serde_json::to_string_pretty(&status).context("failed to serialize status")
}

pub fn run<W, Tz>(writer: &mut W, args: &StatusArgs, store: &EntryStore, now: &DateTime<Tz>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let entries = store
        .load()
        .with_context(|| format!("failed to read {}", store.path().display()))?;
    let data = compute_status(&entries, now)?;

    if args.json {
        writeln!(writer, "{}", format_status_json(&data)?)?;
    } else {
        write!(writer, "{}", format_status(&data, &now.timezone()))?;
    }
    Ok(())
}
