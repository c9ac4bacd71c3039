//! Core type definitions with validation.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

/// Validation errors for entries, windows and user-supplied times.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The end of a range is not strictly after its start.
    #[error("end time ({end}) must be after start time ({start})")]
    InvalidTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A time that must already have happened lies in the future.
    #[error("{field} cannot be in the future ({at} is after {now})")]
    InFuture {
        field: &'static str,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// Entry text was empty after trimming.
    #[error("entry text cannot be empty")]
    EmptyText,

    /// Entry text has leading or trailing whitespace, which the log format cannot keep.
    #[error("entry text must not start or end with whitespace")]
    UntrimmedText,

    /// Entry text spans several lines, which the log format cannot represent.
    #[error("entry text must be a single line")]
    MultiLineText,

    /// A calendar date range ends before it starts.
    #[error("end date {to} cannot be before start date {from}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    /// Date arithmetic left the representable calendar.
    #[error("date {date} is out of range")]
    DateOutOfRange { date: NaiveDate },

    /// A quick entry carried more than a start and an end time.
    #[error("specify at most two times (start and optional end), got {count}")]
    TooManyTimes { count: usize },

    /// A time of day did not parse as `H:MM` or was out of range.
    #[error("invalid time of day: {value}")]
    InvalidTimeOfDay { value: String },
}

/// A half-open `[start, end)` range of UTC instants.
///
/// Windows are always non-empty: `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    /// Creates a window, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Inclusive lower bound.
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive upper bound.
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns `true` if `at` falls inside the half-open range.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    /// Splits the window into two adjacent windows at `at`.
    ///
    /// Returns `None` unless `at` lies strictly inside the window.
    pub fn split_at(&self, at: DateTime<Utc>) -> Option<(Self, Self)> {
        if at <= self.start || at >= self.end {
            return None;
        }
        Some((
            Self {
                start: self.start,
                end: at,
            },
            Self { start: at, end: self.end },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, hour, minute, 0).unwrap()
    }

    #[test]
    fn window_rejects_empty_and_inverted_ranges() {
        assert!(Window::new(at(9, 0), at(9, 0)).is_err());
        assert_eq!(
            Window::new(at(10, 0), at(9, 0)).unwrap_err(),
            ValidationError::InvalidTimeRange {
                start: at(10, 0),
                end: at(9, 0),
            }
        );
    }

    #[test]
    fn window_is_half_open() {
        let window = Window::new(at(9, 0), at(10, 0)).unwrap();
        assert!(window.contains(at(9, 0)));
        assert!(window.contains(at(9, 59)));
        assert!(!window.contains(at(10, 0)));
        assert_eq!(window.duration(), Duration::hours(1));
    }

    #[test]
    fn split_at_produces_adjacent_windows() {
        let window = Window::new(at(9, 0), at(10, 0)).unwrap();
        let (left, right) = window.split_at(at(9, 20)).unwrap();
        assert_eq!(left.end(), right.start());
        assert_eq!(left.duration() + right.duration(), window.duration());

        assert!(window.split_at(at(9, 0)).is_none());
        assert!(window.split_at(at(10, 0)).is_none());
    }

    #[test]
    fn window_serializes_bounds_as_rfc3339() {
        let window = Window::new(at(9, 0), at(10, 0)).unwrap();
        let json = serde_json::to_string(&window).unwrap();
        assert_eq!(
            json,
            r#"{"start":"2025-01-06T09:00:00Z","end":"2025-01-06T10:00:00Z"}"#
        );
    }
}
