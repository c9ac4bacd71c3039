//! Shared utilities for CLI commands.

use std::fmt::Display;
use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use tl_core::{parse_time_of_day, resolve_local};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Local date-time layouts accepted without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a user-supplied point in time.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z", "2026-01-15T10:30:00+01:00"
/// - Local date-time without offset: "2026-01-15T10:30", "2026-01-15 10:30"
/// - Local time of day today: "9:15", "09:15"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_when<Tz: TimeZone>(s: &str, now_local: &DateTime<Tz>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    let tz = now_local.timezone();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(resolve_local(naive, &tz));
    }

    if let Ok(time) = parse_time_of_day(s) {
        return Ok(resolve_local(now_local.date_naive().and_time(time), &tz));
    }

    // Try relative time: "N hours/minutes/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Cannot parse time: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z), HH:MM, or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    let duration = Duration::minutes(n * minutes_per_unit);
    Ok(now_local.with_timezone(&Utc) - duration)
}

/// Formats a duration as hours and zero-padded minutes, e.g. `1h30m`, `0h05m`.
///
/// Seconds are floored; negative durations print as `0h00m`.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    format!("{hours}h{minutes:02}m")
}

/// Formats a UTC instant in the caller's zone.
pub fn format_local<Tz>(at: DateTime<Utc>, tz: &Tz, fmt: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(tz).format(fmt).to_string()
}

/// Joins positional words back into one description.
pub fn join_text(words: &[String]) -> String {
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn now_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 14, 0, 0).unwrap()
    }

    fn now_plus_one() -> DateTime<FixedOffset> {
        now_utc().with_timezone(&FixedOffset::east_opt(3600).unwrap())
    }

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_when("2026-01-15T10:30:00Z", &now_utc()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 10, 30, 0).unwrap());

        let parsed = parse_when("2026-01-15T10:30:00+01:00", &now_utc()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn naive_datetime_is_local() {
        let parsed = parse_when("2026-01-14T08:00", &now_plus_one()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 14, 7, 0, 0).unwrap());

        let parsed = parse_when("2026-01-14 08:00:30", &now_plus_one()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 14, 7, 0, 30).unwrap());
    }

    #[test]
    fn time_of_day_is_today_local() {
        let parsed = parse_when("9:15", &now_plus_one()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 8, 15, 0).unwrap());
    }

    #[test]
    fn parses_relative_time() {
        let now = now_utc();
        assert_eq!(parse_when("2 hours ago", &now).unwrap(), now - Duration::hours(2));
        assert_eq!(
            parse_when("30 minutes ago", &now).unwrap(),
            now - Duration::minutes(30)
        );
        assert_eq!(parse_when("1 day ago", &now).unwrap(), now - Duration::days(1));
        assert_eq!(parse_when("1 week ago", &now).unwrap(), now - Duration::weeks(1));
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_when("whenever", &now_utc()).unwrap_err();
        assert!(err.to_string().contains("Cannot parse time: whenever"));
        assert!(parse_when("25:00", &now_utc()).is_err());
    }

    #[test]
    fn rejects_huge_relative_values() {
        let err = parse_when("99999999999 weeks ago", &now_utc()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn format_duration_pads_minutes() {
        assert_eq!(format_duration(Duration::minutes(90)), "1h30m");
        assert_eq!(format_duration(Duration::minutes(5)), "0h05m");
        assert_eq!(format_duration(Duration::hours(12)), "12h00m");
    }

    #[test]
    fn format_duration_floors_seconds() {
        assert_eq!(format_duration(Duration::seconds(45 * 60 + 59)), "0h45m");
    }

    #[test]
    fn format_duration_negative_is_zero() {
        assert_eq!(format_duration(Duration::minutes(-3)), "0h00m");
    }

    #[test]
    fn format_local_uses_zone() {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 23, 30, 0).unwrap();
        let tz = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(format_local(at, &tz, "%Y-%m-%d %H:%M"), "2026-01-16 00:30");
    }
}
