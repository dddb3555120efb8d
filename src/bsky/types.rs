//! Wire types for the subset of the `app.bsky` / `com.atproto` lexicons the
//! tools use.
//!
//! Views returned by queries are deserialized loosely (unknown fields are
//! ignored, counters are optional). Records written by the tools are strict
//! typed structs tagged with their `$type` so a record cannot be submitted
//! with a missing required field.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const POST_COLLECTION: &str = "app.bsky.feed.post";
pub const LIST_ITEM_COLLECTION: &str = "app.bsky.graph.listitem";
pub const FOLLOW_COLLECTION: &str = "app.bsky.graph.follow";

/// Current time in the format the record lexicons expect.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Session / pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub did: String,
    pub handle: String,
}

/// One page of a cursor-paginated query.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Relationship between the logged-in account and another profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    /// AT-URI of the viewer's follow record, when the viewer follows.
    pub following: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub viewer: ViewerState,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewDetailed {
    pub did: String,
    pub handle: String,
    pub posts_count: Option<u64>,
    pub followers_count: Option<u64>,
    pub follows_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListView {
    pub uri: String,
    pub cid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListItemView {
    pub uri: String,
    pub subject: ProfileView,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostView {
    pub uri: String,
    pub cid: String,
    pub author: ProfileView,
    /// Kept untyped: only inspected, never re-submitted.
    pub record: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedViewPost {
    pub post: PostView,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrongRef {
    pub uri: String,
    pub cid: String,
}

/// Blob reference as returned by `uploadBlob`, passed back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(pub serde_json::Value);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    #[serde(rename = "app.bsky.richtext.facet#link")]
    Link { uri: String },
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
    #[serde(rename = "app.bsky.richtext.facet#mention")]
    Mention { did: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<FacetFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEmbed {
    pub alt: String,
    pub image: Blob,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Embed {
    #[serde(rename = "app.bsky.embed.images")]
    Images { images: Vec<ImageEmbed> },
    #[serde(rename = "app.bsky.embed.record")]
    Record { record: StrongRef },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub langs: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemRecord {
    pub subject: String,
    pub list: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRecord {
    pub subject: String,
    pub created_at: String,
}

/// Any record the tools create, tagged with its lexicon id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Record {
    #[serde(rename = "app.bsky.feed.post")]
    Post(PostRecord),
    #[serde(rename = "app.bsky.graph.listitem")]
    ListItem(ListItemRecord),
    #[serde(rename = "app.bsky.graph.follow")]
    Follow(FollowRecord),
}

impl Record {
    pub fn post(text: String, facets: Vec<Facet>, embed: Option<Embed>) -> Self {
        Record::Post(PostRecord {
            text,
            facets,
            embed,
            langs: vec!["en".into()],
            created_at: now_timestamp(),
        })
    }

    pub fn list_item(subject: &str, list: &str) -> Self {
        Record::ListItem(ListItemRecord {
            subject: subject.to_string(),
            list: list.to_string(),
            created_at: now_timestamp(),
        })
    }

    pub fn follow(subject: &str) -> Self {
        Record::Follow(FollowRecord {
            subject: subject.to_string(),
            created_at: now_timestamp(),
        })
    }

    /// Collection NSID the record is stored under.
    pub fn collection(&self) -> &'static str {
        match self {
            Record::Post(_) => POST_COLLECTION,
            Record::ListItem(_) => LIST_ITEM_COLLECTION,
            Record::Follow(_) => FOLLOW_COLLECTION,
        }
    }
}

// ---------------------------------------------------------------------------
// AT-URI
// ---------------------------------------------------------------------------

/// `at://<repo>/<collection>/<rkey>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtUri {
    pub repo: String,
    pub collection: String,
    pub rkey: String,
}

impl FromStr for AtUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("at://")
            .ok_or_else(|| Error::Parse(format!("not an AT-URI: {s}")))?;
        let parts: Vec<&str> = rest.split('/').collect();
        match parts.as_slice() {
            [repo, collection, rkey] if !repo.is_empty() && !collection.is_empty() && !rkey.is_empty() => {
                Ok(AtUri {
                    repo: repo.to_string(),
                    collection: collection.to_string(),
                    rkey: rkey.to_string(),
                })
            }
            _ => Err(Error::Parse(format!("AT-URI without record key: {s}"))),
        }
    }
}

impl fmt::Display for AtUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at://{}/{}/{}", self.repo, self.collection, self.rkey)
    }
}
