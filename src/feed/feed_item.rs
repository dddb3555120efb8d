//! The entry type shared by feed sources.
//!
//! `FeedEntry` is a single item of a polled feed, normalised so the puzzle
//! pipeline does not care which source produced it. Entries live for one
//! poll cycle and are never mutated.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A single feed entry.
///
/// Entries compare by publication date only; see [`posting_order`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedEntry {
    /// Permalink of the entry. For RSS this is the `<guid>` element
    /// (falling back to `<link>`); the puzzle post id is its trailing
    /// numeric path segment.
    pub id: String,

    pub title: String,

    /// HTML summary. Embedded media URLs are percent-encoded inside it.
    pub summary: Option<String>,

    pub published: Option<DateTime<Utc>>,
}

impl FeedEntry {
    pub fn summary(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }
}

impl Ord for FeedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.published.cmp(&other.published)
    }
}

impl PartialOrd for FeedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reorder a feed batch for cross-posting: oldest first, undated entries
/// ahead of everything. Feeds list newest first, so entries sharing a date
/// end up in reverse feed order.
pub fn posting_order(entries: &mut [FeedEntry]) {
    entries.reverse();
    entries.sort();
}
