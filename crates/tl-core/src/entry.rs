//! Timestamped log entries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::tags::extract_tags;
use crate::types::ValidationError;

/// One record of the time log.
///
/// An entry without `end` is *open*: the work it describes is still running.
/// The log holds at most one open entry at a time; that invariant is enforced by the store,
/// which sees the whole sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// When the work started (UTC).
    pub start: DateTime<Utc>,
    /// When the work ended (UTC), or `None` while running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Free-form description, possibly containing `#tag` tokens.
    pub text: String,
}

impl Entry {
    /// Creates an open entry starting at `start`.
    pub fn open(start: DateTime<Utc>, text: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            start,
            end: None,
            text: normalize_text(text.into())?,
        })
    }

    /// Creates a completed entry. `end` must be strictly after `start`.
    pub fn closed(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self {
            start,
            end: Some(end),
            text: normalize_text(text.into())?,
        })
    }

    /// Checks the per-entry invariants for entries built field by field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.end {
            Some(end) if end <= self.start => {
                return Err(ValidationError::InvalidTimeRange {
                    start: self.start,
                    end,
                });
            }
            _ => {}
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.text.contains(['\n', '\r']) {
            return Err(ValidationError::MultiLineText);
        }
        if self.text.trim() != self.text {
            return Err(ValidationError::UntrimmedText);
        }
        Ok(())
    }

    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// The end used for interval math: the stored end, or `now` while running.
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.end.unwrap_or(now)
    }

    /// Elapsed time of the entry, never negative.
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        (self.effective_end(now) - self.start).max(Duration::zero())
    }

    /// Tags embedded in the text, in order of first appearance.
    pub fn tags(&self) -> Vec<String> {
        extract_tags(&self.text)
    }
}

fn normalize_text(text: String) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if trimmed.contains(['\n', '\r']) {
        return Err(ValidationError::MultiLineText);
    }
    Ok(trimmed.to_string())
}
