//! In-memory [`Bluesky`] fake that records every mutation.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use super::types::*;
use super::Bluesky;
use crate::error::{Error, Result};

pub const SELF_DID: &str = "did:plc:self";

#[derive(Debug, Clone, PartialEq)]
pub struct Deleted {
    pub repo: String,
    pub collection: String,
    pub rkey: String,
}

/// Each paginated collection is served as a list of pages; the cursor of
/// page `n` is `"n+1"` unless it is the last one.
#[derive(Default)]
pub struct FakeBluesky {
    pub feed_pages: Vec<Vec<FeedViewPost>>,
    pub list_pages: Vec<Vec<ListView>>,
    pub list_item_pages: Vec<Vec<ListItemView>>,
    pub follow_pages: Vec<Vec<ProfileView>>,
    pub profiles: HashMap<String, ProfileViewDetailed>,

    /// Queued results for `create_record`, consumed in order; empty means Ok.
    pub create_failures: RefCell<VecDeque<Option<Error>>>,
    /// Queued results for `delete_record`, consumed in order; empty means Ok.
    pub delete_failures: RefCell<VecDeque<Option<Error>>>,

    pub created: RefCell<Vec<Record>>,
    pub deleted: RefCell<Vec<Deleted>>,
    pub uploads: RefCell<Vec<(usize, String)>>,
}

fn page<T: Clone>(pages: &[Vec<T>], cursor: Option<&str>) -> Result<Page<T>> {
    let index: usize = match cursor {
        None => 0,
        Some(c) => c.parse().map_err(|_| Error::Parse(format!("bad cursor {c}")))?,
    };
    let items = pages.get(index).cloned().unwrap_or_default();
    let cursor = (index + 1 < pages.len()).then(|| (index + 1).to_string());
    Ok(Page::new(items, cursor))
}

impl FakeBluesky {
    pub fn created_records(&self) -> Vec<Record> {
        self.created.borrow().clone()
    }
}

impl Bluesky for FakeBluesky {
    fn session_did(&self) -> &str {
        SELF_DID
    }

    fn author_feed(&self, _actor: &str, cursor: Option<&str>) -> Result<Page<FeedViewPost>> {
        page(&self.feed_pages, cursor)
    }

    fn profiles(&self, actors: &[&str]) -> Result<Vec<ProfileViewDetailed>> {
        Ok(actors
            .iter()
            .filter_map(|actor| self.profiles.get(*actor).cloned())
            .collect())
    }

    fn lists(&self, _actor: &str, cursor: Option<&str>) -> Result<Page<ListView>> {
        page(&self.list_pages, cursor)
    }

    fn list_items(&self, _list: &str, cursor: Option<&str>) -> Result<Page<ListItemView>> {
        page(&self.list_item_pages, cursor)
    }

    fn follows(&self, _actor: &str, cursor: Option<&str>) -> Result<Page<ProfileView>> {
        page(&self.follow_pages, cursor)
    }

    fn create_record(&self, record: &Record) -> Result<StrongRef> {
        if let Some(Some(err)) = self.create_failures.borrow_mut().pop_front() {
            return Err(err);
        }
        let mut created = self.created.borrow_mut();
        created.push(record.clone());
        Ok(StrongRef {
            uri: format!("at://{SELF_DID}/{}/{}", record.collection(), created.len()),
            cid: format!("bafy{}", created.len()),
        })
    }

    fn delete_record(&self, repo: &str, collection: &str, rkey: &str) -> Result<()> {
        if let Some(Some(err)) = self.delete_failures.borrow_mut().pop_front() {
            return Err(err);
        }
        self.deleted.borrow_mut().push(Deleted {
            repo: repo.to_string(),
            collection: collection.to_string(),
            rkey: rkey.to_string(),
        });
        Ok(())
    }

    fn upload_blob(&self, data: Vec<u8>, mime_type: &str) -> Result<Blob> {
        self.uploads.borrow_mut().push((data.len(), mime_type.to_string()));
        Ok(Blob(serde_json::json!({
            "$type": "blob",
            "ref": { "$link": "bafkreifake" },
            "mimeType": mime_type,
            "size": data.len(),
        })))
    }
}

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

pub fn profile_view(handle: &str, did: &str) -> ProfileView {
    ProfileView {
        did: did.to_string(),
        handle: handle.to_string(),
        viewer: ViewerState::default(),
    }
}

pub fn detailed(handle: &str, did: &str, posts: u64, followers: u64, follows: u64) -> ProfileViewDetailed {
    ProfileViewDetailed {
        did: did.to_string(),
        handle: handle.to_string(),
        posts_count: Some(posts),
        followers_count: Some(followers),
        follows_count: Some(follows),
    }
}

pub fn api_error(status: u16) -> Error {
    Error::Api {
        endpoint: "test".into(),
        status,
        message: "boom".into(),
    }
}
