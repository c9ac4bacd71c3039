//! Line codec for the log file.
//!
//! One entry per line:
//!
//! ```text
//! 2024-01-01T09:00:00Z 2024-01-01T10:30:00Z|Write docs #project
//! 2024-01-01T11:00:00Z -|Review #project
//! ```
//!
//! The start and end columns are separated by whitespace, `-` marks a running entry, and
//! everything after the first `|` is the entry text. Blank lines and lines starting with
//! `#` are skipped on read.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

use tl_core::{Entry, ValidationError};

use crate::StoreError;

/// Placeholder written in the end column of a running entry.
pub const OPEN_PLACEHOLDER: &str = "-";

/// Separator between the time columns and the text.
pub const TEXT_SEPARATOR: char = '|';

/// Why a line of the log could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorruptReason {
    /// No `|` between the timestamps and the text.
    #[error("missing '{TEXT_SEPARATOR}' separator")]
    MissingSeparator,
    /// The time part did not hold exactly a start and an end column.
    #[error("expected start and end columns, found {found}")]
    ColumnCount { found: usize },
    /// A timestamp column did not parse.
    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },
    /// The parsed entry breaks a per-entry invariant.
    #[error(transparent)]
    InvalidEntry(#[from] ValidationError),
    /// The line is not valid UTF-8.
    #[error("invalid UTF-8 after byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize },
    /// A second running entry; only one may be open at a time.
    #[error("second open entry (first open entry is on line {first_line})")]
    SecondOpenEntry { first_line: usize },
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Serializes a single entry, without a trailing newline.
pub fn format_entry(entry: &Entry) -> String {
    let start = format_timestamp(entry.start);
    let end = entry
        .end
        .map_or_else(|| OPEN_PLACEHOLDER.to_string(), format_timestamp);
    format!("{start} {end}{TEXT_SEPARATOR}{}", entry.text)
}

/// Parses a timestamp column.
///
/// Accepts RFC 3339 with any offset (normalized to UTC). Hand-written timestamps without an
/// offset are read as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CorruptReason> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CorruptReason::InvalidTimestamp {
            value: raw.to_string(),
        })
}

/// Parses a single, non-blank line into an entry.
pub fn parse_entry(raw: &str) -> Result<Entry, CorruptReason> {
    let (times, text) = raw
        .split_once(TEXT_SEPARATOR)
        .ok_or(CorruptReason::MissingSeparator)?;
    let columns: Vec<&str> = times.split_whitespace().collect();
    let [start_raw, end_raw] = columns.as_slice() else {
        return Err(CorruptReason::ColumnCount {
            found: columns.len(),
        });
    };

    let start = parse_timestamp(start_raw)?;
    let entry = if *end_raw == OPEN_PLACEHOLDER {
        Entry::open(start, text)?
    } else {
        Entry::closed(start, parse_timestamp(end_raw)?, text)?
    };
    Ok(entry)
}

/// Parses a whole log file.
///
/// Fails on the first malformed line; nothing is skipped except blanks and comments.
pub fn parse_log(content: &str) -> Result<Vec<Entry>, StoreError> {
    parse_log_bytes(content.as_bytes())
}

/// Parses raw file contents, decoding each line separately so a bad byte is reported with
/// its line number.
pub fn parse_log_bytes(content: &[u8]) -> Result<Vec<Entry>, StoreError> {
    let mut entries = Vec::new();
    let mut open_line: Option<usize> = None;

    for (idx, bytes) in content.split(|b| *b == b'\n').enumerate() {
        let line = idx + 1;
        let raw = std::str::from_utf8(bytes).map_err(|e| StoreError::CorruptLog {
            line,
            content: String::from_utf8_lossy(bytes).into_owned(),
            reason: CorruptReason::InvalidUtf8 {
                valid_up_to: e.valid_up_to(),
            },
        })?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let corrupt = |reason| StoreError::CorruptLog {
            line,
            content: raw.to_string(),
            reason,
        };
        let entry = parse_entry(trimmed).map_err(corrupt)?;
        if entry.is_open() {
            if let Some(first_line) = open_line {
                return Err(corrupt(CorruptReason::SecondOpenEntry { first_line }));
            }
            open_line = Some(line);
        }
        entries.push(entry);
    }

    Ok(entries)
}

/// Serializes entries sorted by start, one per line, with a trailing newline.
pub fn serialize_log(entries: &[Entry]) -> String {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.start);

    let mut out = String::new();
    for entry in sorted {
        out.push_str(&format_entry(entry));
        out.push('\n');
    }
    out
}
