//! Quick-entry parsing: free text with `@HH:MM` time overrides.
//!
//! `"Fix login bug #auth @9:15 @10:40"` becomes the text `"Fix login bug #auth"` with a
//! start at 09:15 and an end at 10:40 local time on the current day.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

use crate::types::ValidationError;
use crate::window::resolve_local;

/// Pre-compiled regex for `@H:MM` / `@HH:MM` tokens.
static TIME_OVERRIDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\d{1,2}:\d{2})").unwrap());

/// Pre-compiled regex for a bare time of day.
static TIME_OF_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap());

/// Text and optional time overrides extracted from a quick entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickEntry {
    /// Description with the time tokens removed and whitespace collapsed.
    pub text: String,
    /// First `@HH:MM`, as a UTC instant.
    pub start: Option<DateTime<Utc>>,
    /// Second `@HH:MM`, as a UTC instant. Only present together with `start`.
    pub end: Option<DateTime<Utc>>,
}

/// Parses `H:MM` or `HH:MM` (24-hour clock).
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    let invalid = || ValidationError::InvalidTimeOfDay {
        value: value.to_string(),
    };
    let caps = TIME_OF_DAY_RE.captures(value.trim()).ok_or_else(invalid)?;
    let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Splits `raw` into description text and up to two local times of day.
///
/// Times are placed on the local date of `now_local` and converted to UTC with its zone.
pub fn parse_quick_entry<Tz: TimeZone>(
    raw: &str,
    now_local: &DateTime<Tz>,
) -> Result<QuickEntry, ValidationError> {
    let tokens: Vec<&str> = TIME_OVERRIDE_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    if tokens.len() > 2 {
        return Err(ValidationError::TooManyTimes {
            count: tokens.len(),
        });
    }

    let tz = now_local.timezone();
    let today = now_local.date_naive();
    let times = tokens
        .iter()
        .map(|token| parse_time_of_day(token).map(|time| resolve_local(today.and_time(time), &tz)))
        .collect::<Result<Vec<_>, _>>()?;

    let stripped = TIME_OVERRIDE_RE.replace_all(raw, "");
    let text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }

    Ok(QuickEntry {
        text,
        start: times.first().copied(),
        end: times.get(1).copied(),
    })
}
