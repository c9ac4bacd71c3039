//! Storage layer for the time log.
//!
//! Entries live in a single human-editable text file (see [`codec`] for the line format).
//! [`EntryStore`] is the only owner of that file.
//!
//! # Consistency
//!
//! Every mutation reloads the whole file, validates against what it just read, and then
//! atomically replaces the file (write to a temporary file in the same directory, then
//! rename). A crash mid-write therefore leaves either the old or the new log, never a
//! truncated one.
//!
//! The store assumes a single writer. There is no cross-process lock: if another process
//! writes between our load and our rename, its change is lost. Read-only callers may re-read
//! at any time.
//!
//! # Time
//!
//! Operations that depend on the current time take `now` as a parameter; the store never
//! reads the clock.

pub mod codec;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tempfile::NamedTempFile;
use thiserror::Error;

use tl_core::{Entry, ValidationError, check_overlap, stop_time};

pub use codec::CorruptReason;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A line of the log could not be parsed. Loading stops at the first such line.
    #[error("corrupt log at line {line}: {reason}")]
    CorruptLog {
        line: usize,
        content: String,
        #[source]
        reason: CorruptReason,
    },

    /// An entry is already running; it must be stopped first.
    #[error("an entry is already running: '{text}' since {start}")]
    EntryAlreadyRunning { start: DateTime<Utc>, text: String },

    /// Stop was requested with nothing running.
    #[error("no active entry to stop")]
    NoActiveEntry,

    /// A retroactive entry intersects an existing one.
    #[error(
        "entry overlaps with existing entry starting at {} for {} minutes",
        .existing.start,
        .overlap.num_minutes()
    )]
    Overlap { existing: Entry, overlap: Duration },

    /// Invalid entry or time range.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Reading or writing the log file failed.
    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Position of the running entry, if any.
///
/// A linear scan from the end: logs are small, and the running entry is usually last.
pub fn find_open(entries: &[Entry]) -> Option<usize> {
    entries.iter().rposition(Entry::is_open)
}

/// The time log file.
#[derive(Debug, Clone)]
pub struct EntryStore {
    path: PathBuf,
}

impl EntryStore {
    /// Creates a store backed by `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &'static str) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }

    /// Reads every entry in file order.
    ///
    /// A missing or empty file is an empty log.
    pub fn load(&self) -> Result<Vec<Entry>, StoreError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "log file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error("read")(e)),
        };
        let entries = codec::parse_log_bytes(&content)?;
        tracing::debug!(path = %self.path.display(), count = entries.len(), "loaded log");
        Ok(entries)
    }

    /// Appends `entry` after validating it against the current file contents.
    pub fn append(&self, entry: Entry) -> Result<(), StoreError> {
        entry.validate()?;
        let mut entries = self.load()?;
        if entry.is_open() {
            ensure_none_running(&entries)?;
        }
        entries.push(entry);
        self.write_all(&entries)
    }

    /// Atomically replaces the file with `entries`, sorted by start.
    ///
    /// Rejects sequences that break an entry invariant or hold more than one open entry.
    pub fn write_all(&self, entries: &[Entry]) -> Result<(), StoreError> {
        let mut open: Option<&Entry> = None;
        for entry in entries {
            entry.validate()?;
            if entry.is_open() {
                if let Some(running) = open {
                    return Err(StoreError::EntryAlreadyRunning {
                        start: running.start,
                        text: running.text.clone(),
                    });
                }
                open = Some(entry);
            }
        }

        let content = codec::serialize_log(entries);
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(self.io_error("create directory for"))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(self.io_error("create temporary file for"))?;
        tmp.write_all(content.as_bytes())
            .map_err(self.io_error("write"))?;
        tmp.as_file().sync_all().map_err(self.io_error("sync"))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error("replace")(e.error))?;

        tracing::debug!(path = %self.path.display(), count = entries.len(), "wrote log");
        Ok(())
    }

    /// The running entry, if any.
    pub fn open_entry(&self) -> Result<Option<Entry>, StoreError> {
        let entries = self.load()?;
        Ok(find_open(&entries).map(|idx| entries[idx].clone()))
    }

    /// Starts a new running entry at `at`.
    pub fn start(
        &self,
        text: &str,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Entry, StoreError> {
        let entry = Entry::open(at, text)?;
        if at > now {
            return Err(ValidationError::InFuture {
                field: "start time",
                at,
                now,
            }
            .into());
        }
        self.append(entry.clone())?;
        tracing::info!(start = %entry.start, text = %entry.text, "started entry");
        Ok(entry)
    }

    /// Stops the running entry at `at`.
    ///
    /// A stop at or before the entry's start records `start + 1 minute` instead.
    pub fn stop(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> Result<Entry, StoreError> {
        if at > now {
            return Err(ValidationError::InFuture {
                field: "stop time",
                at,
                now,
            }
            .into());
        }
        let mut entries = self.load()?;
        let idx = find_open(&entries).ok_or(StoreError::NoActiveEntry)?;

        let end = stop_time(entries[idx].start, at);
        if end != at {
            tracing::debug!(requested = %at, adjusted = %end, "stop time moved after entry start");
        }
        entries[idx].end = Some(end);
        let stopped = entries[idx].clone();

        self.write_all(&entries)?;
        tracing::info!(start = %stopped.start, end = %end, "stopped entry");
        Ok(stopped)
    }

    /// Records a completed entry retroactively.
    ///
    /// The interval is checked against every entry in the log, with the running entry
    /// extended to `now`.
    pub fn add(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Entry, StoreError> {
        let entry = Entry::closed(start, end, text)?;
        if end > now {
            return Err(ValidationError::InFuture {
                field: "end time",
                at: end,
                now,
            }
            .into());
        }

        let mut entries = self.load()?;
        if let Some(overlap) = check_overlap(&entries, start, end, now) {
            return Err(StoreError::Overlap {
                existing: overlap.entry.clone(),
                overlap: overlap.duration,
            });
        }
        entries.push(entry.clone());
        self.write_all(&entries)?;
        tracing::info!(start = %entry.start, end = %end, "added entry");
        Ok(entry)
    }
}

fn ensure_none_running(entries: &[Entry]) -> Result<(), StoreError> {
    match find_open(entries) {
        Some(idx) => Err(StoreError::EntryAlreadyRunning {
            start: entries[idx].start,
            text: entries[idx].text.clone(),
        }),
        None => Ok(()),
    }
}
