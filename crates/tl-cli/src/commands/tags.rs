//! Tags command: lists every tag used in the log.

use std::io::Write;

use anyhow::{Context, Result};

use tl_core::unique_tags;
use tl_store::EntryStore;

pub fn run<W: Write>(writer: &mut W, store: &EntryStore) -> Result<()> {
    let entries = store
        .load()
        .with_context(|| format!("failed to read {}", store.path().display()))?;
    let tags = unique_tags(&entries);

    if tags.is_empty() {
        writeln!(writer, "No tags recorded yet.")?;
        return Ok(());
    }
    for tag in tags {
        writeln!(writer, "{tag}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use tl_core::Entry;

    #[test]
    fn lists_tags_in_first_seen_casing() {
        let temp = tempfile::tempdir().unwrap();
        let store = EntryStore::new(temp.path().join("log.txt"));
        let at = |h| Utc.with_ymd_and_hms(2025, 1, 6, h, 0, 0).unwrap();
        store
            .write_all(&[
                Entry::closed(at(9), at(10), "Write docs #Project #docs").unwrap(),
                Entry::closed(at(10), at(11), "more #project #review").unwrap(),
            ])
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &store).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Project\ndocs\nreview\n");
    }

    #[test]
    fn empty_log_has_no_tags() {
        let temp = tempfile::tempdir().unwrap();
        let store = EntryStore::new(temp.path().join("log.txt"));

        let mut output = Vec::new();
        run(&mut output, &store).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No tags recorded yet.\n");
    }
}
