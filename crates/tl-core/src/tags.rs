//! Inline `#tag` extraction.
//!
//! Tags are schema-less: any whitespace-delimited token starting with `#` names one.
//! Identity is case-insensitive (`#Rust` and `#rust` are the same tag), while display
//! keeps the first spelling seen in the log.

use std::collections::HashMap;

use crate::entry::Entry;

/// Label of the synthetic bucket for entries without any tag.
///
/// Only used during aggregation; it is never stored as a literal tag.
pub const UNTAGGED: &str = "(untagged)";

/// Extracts the tags embedded in `text`, in order of first appearance.
///
/// A token contributes the run of word characters (alphanumerics and `_`) that follows its
/// leading `#`, so `#project,` yields `project`. A bare `#` contributes nothing.
/// Repeats of the same tag (ignoring case) keep the first spelling.
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        let Some(rest) = token.strip_prefix('#') else {
            continue;
        };
        let len = rest
            .char_indices()
            .find(|(_, c)| !is_word_char(*c))
            .map_or(rest.len(), |(idx, _)| idx);
        if len == 0 {
            continue;
        }
        let tag = &rest[..len];
        if !tags.iter().any(|seen| seen.to_lowercase() == tag.to_lowercase()) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Grouping key for a tag.
pub fn tag_key(tag: &str) -> String {
    tag.to_lowercase()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// First-seen display spelling for every tag key across a sequence of entries.
#[derive(Debug, Clone, Default)]
pub struct TagLabels {
    order: Vec<String>,
    labels: HashMap<String, String>,
}

impl TagLabels {
    /// Scans `entries` in order, remembering the first spelling of each tag.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut labels = Self::default();
        for entry in entries {
            for tag in entry.tags() {
                labels.observe(&tag);
            }
        }
        labels
    }

    fn observe(&mut self, tag: &str) {
        let key = tag_key(tag);
        if !self.labels.contains_key(&key) {
            self.order.push(key.clone());
            self.labels.insert(key, tag.to_string());
        }
    }

    /// Display label for a tag key (or any spelling of it).
    pub fn label(&self, tag: &str) -> Option<&str> {
        self.labels.get(&tag_key(tag)).map(String::as_str)
    }

    /// All labels in first-seen order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter_map(|key| self.labels.get(key).map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Every distinct tag in the log, first-seen order and casing.
pub fn unique_tags<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Vec<String> {
    TagLabels::from_entries(entries)
        .labels()
        .map(str::to_string)
        .collect()
}
