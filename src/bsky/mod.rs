//! Bluesky (AT Protocol) access.
//!
//! The tools talk to the network only through the [`Bluesky`] trait.
//! [`XrpcClient`] is the real, blocking HTTP implementation; tests use the
//! recording fake in `testing`.

mod client;
pub mod richtext;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::XrpcClient;
pub use richtext::TextBuilder;
pub use types::*;

use crate::error::Result;

/// The subset of the social API the tools need.
///
/// Paginated queries take the cursor of the previous page (`None` for the
/// first page) and return a [`Page`].
pub trait Bluesky {
    /// DID of the logged-in account; records are written to this repo.
    fn session_did(&self) -> &str;

    fn author_feed(&self, actor: &str, cursor: Option<&str>) -> Result<Page<FeedViewPost>>;

    fn profiles(&self, actors: &[&str]) -> Result<Vec<ProfileViewDetailed>>;

    fn lists(&self, actor: &str, cursor: Option<&str>) -> Result<Page<ListView>>;

    fn list_items(&self, list: &str, cursor: Option<&str>) -> Result<Page<ListItemView>>;

    fn follows(&self, actor: &str, cursor: Option<&str>) -> Result<Page<ProfileView>>;

    fn create_record(&self, record: &Record) -> Result<StrongRef>;

    fn delete_record(&self, repo: &str, collection: &str, rkey: &str) -> Result<()>;

    fn upload_blob(&self, data: Vec<u8>, mime_type: &str) -> Result<Blob>;
}

/// Drain a cursor-paginated query.
///
/// Stops when a page has no cursor or comes back empty; some endpoints keep
/// handing out a cursor after the last item.
pub fn collect_pages<T, F>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetch(cursor.as_deref())?;
        if page.items.is_empty() {
            break;
        }
        all.extend(page.items);
        match page.cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(all)
}

/// Find one of `actor`'s lists by exact name. The first match wins.
pub fn find_list<B: Bluesky + ?Sized>(bsky: &B, actor: &str, name: &str) -> Result<Option<ListView>> {
    let lists = collect_pages(|cursor| bsky.lists(actor, cursor))?;
    Ok(lists.into_iter().find(|list| list.name == name))
}
