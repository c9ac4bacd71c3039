//! Core domain logic for the plain-text time log.
//!
//! This crate contains the pure parts of the engine:
//! - Entries: the timestamped records stored one per line in the log
//! - Tags: inline `#tag` extraction with case-insensitive identity
//! - Intervals: clamped durations and overlap detection
//! - Aggregation: per-tag, per-task and per-day totals over a query window
//! - Windows: local day/week boundaries expressed as UTC instants
//!
//! Nothing here reads the clock or the filesystem. Callers pass `now` and a time zone
//! explicitly.

pub mod aggregate;
pub mod entry;
pub mod interval;
pub mod quick;
pub mod tags;
pub mod types;
pub mod window;

pub use aggregate::{
    DayTotal, TagBucket, TagSummary, TagTotal, TaskTotal, WindowedEntry, aggregate, daily_totals,
    entries_in_window, top_tasks,
};
pub use entry::Entry;
pub use interval::{Overlap, check_overlap, clamped_duration, stop_time};
pub use quick::{QuickEntry, parse_quick_entry, parse_time_of_day};
pub use tags::{TagLabels, UNTAGGED, extract_tags, tag_key, unique_tags};
pub use types::{ValidationError, Window};
pub use window::{
    date_range_window, day_window, last_day_window, last_week_window, local_date, resolve_local,
    week_window,
};
