//! Report command for summarizing logged time by tag.
//!
//! This module implements `tl report` with various period options
//! (--day, --last-day, --week, --last-week, --from/--to) and output formats (human-readable, JSON).
//! Multi-day reports add per-day totals and the most time-consuming tasks.

use std::fmt::{Display, Write as _};
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use clap::Args;
use serde::Serialize;

use tl_core::{
    DayTotal, Entry, TagSummary, TagTotal, TaskTotal, ValidationError, Window, aggregate,
    daily_totals, date_range_window, day_window, entries_in_window, last_day_window,
    last_week_window, local_date, top_tasks, week_window,
};
use tl_store::EntryStore;

use crate::commands::util::format_duration;

/// Number of tasks listed under TOP TASKS.
const TOP_TASKS_LIMIT: usize = 5;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report on today (default).
    #[arg(long, group = "period")]
    pub day: bool,

    /// Report on yesterday.
    #[arg(long, group = "period")]
    pub last_day: bool,

    /// Report on the current week (Monday to Sunday).
    #[arg(long, group = "period")]
    pub week: bool,

    /// Report on the previous week.
    #[arg(long, group = "period")]
    pub last_week: bool,

    /// First local date of a custom range (YYYY-MM-DD).
    #[arg(long, value_name = "DATE", group = "period")]
    pub from: Option<NaiveDate>,

    /// Last local date of a custom range, inclusive (default: today).
    #[arg(long, value_name = "DATE", requires = "from")]
    pub to: Option<NaiveDate>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    pub fn period(&self) -> Period {
        if let Some(from) = self.from {
            Period::Range { from, to: self.to }
        } else if self.last_day {
            Period::LastDay
        } else if self.week {
            Period::Week
        } else if self.last_week {
            Period::LastWeek
        } else {
            Period::Day
        }
    }
}

/// Report period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    LastDay,
    Week,
    LastWeek,
    /// Inclusive local dates; a missing `to` means today.
    Range {
        from: NaiveDate,
        to: Option<NaiveDate>,
    },
}

/// Period type for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Day,
    Week,
    Range,
}

/// One entry's contribution to the report.
#[derive(Debug, Clone)]
pub struct ReportRow {
    /// Start clipped to the period (UTC).
    pub start: DateTime<Utc>,
    /// End clipped to the period (UTC); `now` for the running entry.
    pub end: DateTime<Utc>,
    pub local_start: NaiveDateTime,
    pub local_end: NaiveDateTime,
    pub duration: Duration,
    pub text: String,
    pub tags: Vec<String>,
    pub running: bool,
}

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub period_type: PeriodType,
    /// First local date covered.
    pub first_day: NaiveDate,
    /// Last local date covered (inclusive).
    pub last_day: NaiveDate,
    pub timezone: String,
    pub summary: TagSummary,
    /// One total per local day of the period, in date order.
    pub days: Vec<DayTotal>,
    pub top_tasks: Vec<TaskTotal>,
    /// Newest first.
    pub rows: Vec<ReportRow>,
}

// ========== Period Calculation ==========

/// Resolves `period` to a UTC window around `now`.
pub fn period_window<Tz: TimeZone>(
    period: Period,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Window, ValidationError> {
    match period {
        Period::Day => day_window(now, tz),
        Period::LastDay => last_day_window(now, tz),
        Period::Week => week_window(now, tz),
        Period::LastWeek => last_week_window(now, tz),
        Period::Range { from, to } => {
            date_range_window(from, to.unwrap_or_else(|| local_date(now, tz)), tz)
        }
    }
}

fn period_type(period: Period, first_day: NaiveDate, last_day: NaiveDate) -> PeriodType {
    match period {
        Period::Day | Period::LastDay => PeriodType::Day,
        Period::Week | Period::LastWeek => PeriodType::Week,
        Period::Range { .. } if first_day == last_day => PeriodType::Day,
        Period::Range { .. } => PeriodType::Range,
    }
}

// ========== Progress Bar ==========

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max <= 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().clamp(0.0, 10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Report Generation ==========

/// Generates report data from the log.
pub fn generate_report_data<Tz: TimeZone>(
    entries: &[Entry],
    period: Period,
    now: &DateTime<Tz>,
    timezone: String,
) -> Result<ReportData> {
    let tz = now.timezone();
    let generated_at = now.with_timezone(&Utc);
    let window = period_window(period, generated_at, &tz)?;

    let first_day = local_date(window.start(), &tz);
    let last_day = local_date(window.end() - Duration::seconds(1), &tz);

    let summary = aggregate(entries, &window, generated_at);
    let day_count = usize::try_from((last_day - first_day).num_days() + 1)?;
    let days = daily_totals(entries, first_day, day_count, &tz, generated_at)?;
    let top_tasks = top_tasks(entries, &window, generated_at, TOP_TASKS_LIMIT);
    let rows = entries_in_window(entries, &window, generated_at)
        .into_iter()
        .map(|row| ReportRow {
            start: row.start,
            end: row.end,
            local_start: row.start.with_timezone(&tz).naive_local(),
            local_end: row.end.with_timezone(&tz).naive_local(),
            duration: row.duration,
            text: row.entry.text.clone(),
            tags: row.entry.tags(),
            running: row.entry.is_open() && row.end == generated_at,
        })
        .collect();
    tracing::debug!(
        window_start = %window.start(),
        window_end = %window.end(),
        entries = summary.entry_count,
        "computed report"
    );

    Ok(ReportData {
        generated_at,
        period_type: period_type(period, first_day, last_day),
        first_day,
        last_day,
        timezone,
        summary,
        days,
        top_tasks,
        rows,
    })
}

/// Formats the period description for the report header.
fn format_period_description(data: &ReportData) -> String {
    match data.period_type {
        // "Monday, Jan 6, 2025"
        PeriodType::Day => data.first_day.format("%A, %b %-d, %Y").to_string(),
        // "Week of Jan 6, 2025"
        PeriodType::Week => format!("Week of {}", data.first_day.format("%b %-d, %Y")),
        PeriodType::Range => format!(
            "{} to {}",
            data.first_day.format("%b %-d, %Y"),
            data.last_day.format("%b %-d, %Y")
        ),
    }
}

fn format_row_span(row: &ReportRow) -> String {
    let end = if row.running {
        "now  ".to_string()
    } else {
        row.local_end.format("%H:%M").to_string()
    };
    format!("{}-{end}", row.local_start.format("%a %d %b %H:%M"))
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    let period_desc = format_period_description(data);
    writeln!(output, "TIME REPORT: {period_desc}").unwrap();

    if data.summary.is_empty() {
        let empty = match data.period_type {
            PeriodType::Day => "No time recorded on this day.",
            PeriodType::Week => "No time recorded this week.",
            PeriodType::Range => "No time recorded in this range.",
        };
        writeln!(output).unwrap();
        writeln!(output, "{empty}").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'tl start <text>' to start tracking.").unwrap();
        return output;
    }

    let max_minutes = data.summary.max_duration().num_minutes();

    // BY TAG section
    writeln!(output).unwrap();
    writeln!(output, "BY TAG").unwrap();
    writeln!(output, "──────").unwrap();
    for total in &data.summary.totals {
        let minutes = total.duration.num_minutes();
        writeln!(
            output,
            "{:<24} {:>7}  {}",
            total.bucket.label(),
            format_duration(total.duration),
            progress_bar(minutes, max_minutes)
        )
        .unwrap();
    }

    if data.period_type != PeriodType::Day {
        write_multi_day_sections(&mut output, data);
    }

    // ENTRIES section
    writeln!(output).unwrap();
    writeln!(output, "ENTRIES").unwrap();
    writeln!(output, "───────").unwrap();
    for row in &data.rows {
        writeln!(
            output,
            "  {}  {:>7}  {}",
            format_row_span(row),
            format_duration(row.duration),
            row.text
        )
        .unwrap();
    }

    // SUMMARY section
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Total tracked:  {}", format_duration(data.summary.total)).unwrap();
    writeln!(output, "Entries:        {}", data.summary.entry_count).unwrap();

    output
}

/// BY DAY and TOP TASKS, shown for weeks and date ranges.
fn write_multi_day_sections(output: &mut String, data: &ReportData) {
    let max_day_minutes = data
        .days
        .iter()
        .map(|day| day.duration.num_minutes())
        .max()
        .unwrap_or(0);

    writeln!(output).unwrap();
    writeln!(output, "BY DAY").unwrap();
    writeln!(output, "──────").unwrap();
    for day in &data.days {
        writeln!(
            output,
            "{:<24} {:>7}  {}",
            day.date.format("%a %d %b").to_string(),
            format_duration(day.duration),
            progress_bar(day.duration.num_minutes(), max_day_minutes)
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "TOP TASKS").unwrap();
    writeln!(output, "─────────").unwrap();
    for task in &data.top_tasks {
        writeln!(output, "  {:>7}  {}", format_duration(task.duration), task.text).unwrap();
    }
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub timezone: String,
    pub period: JsonPeriod,
    pub by_tag: Vec<TagTotal>,
    pub untagged: JsonUntagged,
    pub by_day: Vec<DayTotal>,
    pub top_tasks: Vec<TaskTotal>,
    pub entries: Vec<JsonEntry>,
    pub totals: JsonTotals,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    pub start: String,
    pub end: String,
    #[serde(rename = "type")]
    pub period_type: PeriodType,
}

#[derive(Debug, Serialize)]
pub struct JsonUntagged {
    pub minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonEntry {
    pub start: String,
    pub end: String,
    pub running: bool,
    pub minutes: i64,
    pub text: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonTotals {
    pub minutes: i64,
    pub entry_count: usize,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let by_tag = data
        .summary
        .totals
        .iter()
        .filter(|total| !total.bucket.is_untagged())
        .cloned()
        .collect();

    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        timezone: data.timezone.clone(),
        period: JsonPeriod {
            start: data.first_day.format("%Y-%m-%d").to_string(),
            end: data.last_day.format("%Y-%m-%d").to_string(),
            period_type: data.period_type,
        },
        by_tag,
        untagged: JsonUntagged {
            minutes: data
                .summary
                .untagged()
                .map_or(0, |duration| duration.num_minutes()),
        },
        by_day: data.days.clone(),
        top_tasks: data.top_tasks.clone(),
        entries: data
            .rows
            .iter()
            .map(|row| JsonEntry {
                start: row.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                end: row.end.to_rfc3339_opts(SecondsFormat::Secs, true),
                running: row.running,
                minutes: row.duration.num_minutes(),
                text: row.text.clone(),
                tags: row.tags.clone(),
            })
            .collect(),
        totals: JsonTotals {
            minutes: data.summary.total.num_minutes(),
            entry_count: data.summary.entry_count,
        },
    };

    serde_json::to_string_pretty(&report).context("failed to serialize report")
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W, Tz>(writer: &mut W, args: &ReportArgs, store: &EntryStore, now: &DateTime<Tz>) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let entries = store
        .load()
        .with_context(|| format!("failed to read {}", store.path().display()))?;
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    let data = generate_report_data(&entries, args.period(), now, timezone)?;

    if args.json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }

    Ok(())
}
