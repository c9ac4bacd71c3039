//! Per-tag totals over a query window.
//!
//! Aggregation is a read-only fold: each entry's clamped duration is credited in full to
//! every tag it carries, so an entry tagged `#a #b` counts toward both. Entries without
//! tags land in the synthetic [`UNTAGGED`] bucket.
//!
//! The same fold also yields per-task totals ([`top_tasks`]) and per-day totals
//! ([`daily_totals`]).

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::entry::Entry;
use crate::interval::clamped_duration;
use crate::tags::{TagLabels, UNTAGGED, tag_key};
use crate::types::{ValidationError, Window};
use crate::window::days_window;

/// Serializes a duration as whole minutes, floored.
fn serialize_minutes<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_minutes())
}

/// Grouping bucket for aggregated time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagBucket {
    /// A real tag, carrying its display label.
    Tag(String),
    /// Entries with no tag at all.
    Untagged,
}

impl TagBucket {
    /// Display label: the tag's first-seen spelling, or `(untagged)`.
    pub fn label(&self) -> &str {
        match self {
            Self::Tag(label) => label,
            Self::Untagged => UNTAGGED,
        }
    }

    pub const fn is_untagged(&self) -> bool {
        matches!(self, Self::Untagged)
    }
}

impl fmt::Display for TagBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TagBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Time credited to one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagTotal {
    #[serde(rename = "tag")]
    pub bucket: TagBucket,
    #[serde(rename = "minutes", serialize_with = "serialize_minutes")]
    pub duration: Duration,
}

/// Result of [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSummary {
    /// Buckets sorted by duration descending, then label ascending.
    pub totals: Vec<TagTotal>,
    /// Sum of clamped entry durations, each entry counted once.
    pub total: Duration,
    /// Number of entries with a nonzero contribution.
    pub entry_count: usize,
}

impl TagSummary {
    /// Total for a tag, matched case-insensitively.
    pub fn get(&self, tag: &str) -> Option<Duration> {
        let key = tag_key(tag);
        self.totals
            .iter()
            .find(|t| matches!(&t.bucket, TagBucket::Tag(label) if tag_key(label) == key))
            .map(|t| t.duration)
    }

    /// Total of the `(untagged)` bucket.
    pub fn untagged(&self) -> Option<Duration> {
        self.totals
            .iter()
            .find(|t| t.bucket.is_untagged())
            .map(|t| t.duration)
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// The `limit` largest buckets.
    pub fn top(&self, limit: usize) -> &[TagTotal] {
        &self.totals[..limit.min(self.totals.len())]
    }

    /// Largest bucket total, used to scale bars.
    pub fn max_duration(&self) -> Duration {
        self.totals
            .iter()
            .map(|t| t.duration)
            .max()
            .unwrap_or_else(Duration::zero)
    }
}

/// Sums clamped durations per tag across `window`.
///
/// Display labels come from the whole `entries` slice, not just the entries inside the
/// window, so a tag keeps its spelling regardless of the period being reported.
pub fn aggregate(entries: &[Entry], window: &Window, now: DateTime<Utc>) -> TagSummary {
    let labels = TagLabels::from_entries(entries);
    let mut buckets: HashMap<Option<String>, Duration> = HashMap::new();
    let mut total = Duration::zero();
    let mut entry_count = 0;

    for entry in entries {
        let chunk = clamped_duration(entry, window, now);
        if chunk <= Duration::zero() {
            continue;
        }
        total += chunk;
        entry_count += 1;

        let tags = entry.tags();
        if tags.is_empty() {
            *buckets.entry(None).or_insert_with(Duration::zero) += chunk;
        }
        for tag in tags {
            *buckets
                .entry(Some(tag_key(&tag)))
                .or_insert_with(Duration::zero) += chunk;
        }
    }

    let mut totals: Vec<TagTotal> = buckets
        .into_iter()
        .map(|(key, duration)| {
            let bucket = key.map_or(TagBucket::Untagged, |key| {
                let label = labels.label(&key).map_or(key.clone(), str::to_string);
                TagBucket::Tag(label)
            });
            TagTotal { bucket, duration }
        })
        .collect();
    totals.sort_by(compare_totals);

    TagSummary {
        totals,
        total,
        entry_count,
    }
}

fn compare_totals(a: &TagTotal, b: &TagTotal) -> Ordering {
    Reverse(a.duration)
        .cmp(&Reverse(b.duration))
        .then_with(|| a.bucket.label().to_lowercase().cmp(&b.bucket.label().to_lowercase()))
        .then_with(|| a.bucket.label().cmp(b.bucket.label()))
}

/// An entry's slice of a window, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowedEntry<'a> {
    pub entry: &'a Entry,
    /// Start clipped to the window.
    pub start: DateTime<Utc>,
    /// End (or `now` while running) clipped to the window.
    pub end: DateTime<Utc>,
    pub duration: Duration,
}

/// Entries that contribute time to `window`, newest first.
pub fn entries_in_window<'a>(
    entries: &'a [Entry],
    window: &Window,
    now: DateTime<Utc>,
) -> Vec<WindowedEntry<'a>> {
    let mut rows: Vec<WindowedEntry<'a>> = entries
        .iter()
        .filter_map(|entry| {
            let duration = clamped_duration(entry, window, now);
            (duration > Duration::zero()).then(|| WindowedEntry {
                entry,
                start: entry.start.max(window.start()),
                end: entry.effective_end(now).min(window.end()),
                duration,
            })
        })
        .collect();
    rows.sort_by_key(|row| Reverse(row.start));
    rows
}

/// Time spent on one distinct entry text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTotal {
    pub text: String,
    #[serde(rename = "minutes", serialize_with = "serialize_minutes")]
    pub duration: Duration,
}

/// The `limit` entry texts with the most time in `window`.
///
/// Entries group by exact text. Sorted by duration descending, then text ascending.
pub fn top_tasks(
    entries: &[Entry],
    window: &Window,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<TaskTotal> {
    let mut totals: HashMap<&str, Duration> = HashMap::new();
    for entry in entries {
        let chunk = clamped_duration(entry, window, now);
        if chunk > Duration::zero() {
            *totals.entry(&entry.text).or_insert_with(Duration::zero) += chunk;
        }
    }

    let mut tasks: Vec<TaskTotal> = totals
        .into_iter()
        .map(|(text, duration)| TaskTotal {
            text: text.to_string(),
            duration,
        })
        .collect();
    tasks.sort_by(|a, b| {
        Reverse(a.duration)
            .cmp(&Reverse(b.duration))
            .then_with(|| a.text.cmp(&b.text))
    });
    tasks.truncate(limit);
    tasks
}

/// Time logged on one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    #[serde(rename = "minutes", serialize_with = "serialize_minutes")]
    pub duration: Duration,
}

/// Totals for `days` consecutive local days starting at `first_day`, one per day, in order.
///
/// Days without time are included with a zero total.
pub fn daily_totals<Tz: TimeZone>(
    entries: &[Entry],
    first_day: NaiveDate,
    days: usize,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<Vec<DayTotal>, ValidationError> {
    first_day
        .iter_days()
        .take(days)
        .map(|date| {
            let window = days_window(date, 1, tz)?;
            let duration = entries
                .iter()
                .map(|entry| clamped_duration(entry, &window, now))
                .fold(Duration::zero(), |acc, chunk| acc + chunk);
            Ok(DayTotal { date, duration })
        })
        .collect()
}
