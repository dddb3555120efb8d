//! Duplicate detection against the account's own post history.
//!
//! There is no local idempotency store: every run re-reads the full author
//! feed. A candidate counts as already posted when its source post id occurs
//! anywhere in the serialized facets of an earlier post. The match is a
//! plain substring test, so a change in how the id is rendered inside the
//! link would let a puzzle through twice.

use crate::bsky::{collect_pages, Bluesky, FeedViewPost};
use crate::error::Result;

/// Every post in `actor`'s author feed, all pages.
pub fn own_posts<B: Bluesky + ?Sized>(bsky: &B, actor: &str) -> Result<Vec<FeedViewPost>> {
    collect_pages(|cursor| bsky.author_feed(actor, cursor))
}

pub fn is_duplicate(post_id: &str, existing: &[FeedViewPost]) -> bool {
    existing.iter().any(|item| {
        item.post
            .record
            .get("facets")
            .is_some_and(|facets| facets.to_string().contains(post_id))
    })
}
