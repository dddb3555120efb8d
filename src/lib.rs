//! bsky-bots: small Bluesky automation tools.
//!
//! ## Architecture overview
//!
//! ```text
//!  mate-in-2:  feed::poll ─► puzzle::run ─► bsky (uploadBlob, createRecord)
//!
//!  org-sync:   roster::fetch_roster ─► sync::synchronize ─► bsky (createRecord)
//!                                          │
//!                                   github::ResolveIdentity
//!
//!  unfollow:   unfollow::sweep ─► bsky (getFollows, getProfiles, deleteRecord)
//! ```
//!
//! * **`bsky`**: the [`bsky::Bluesky`] trait, the blocking XRPC client,
//!   typed records and the rich-text builder.
//! * **`feed`**: the `DataSource` trait and the RSS implementation.
//! * **`puzzle`**: classifies feed entries, checks for earlier cross-posts
//!   and posts new puzzles with their board image.
//! * **`roster`**: extracts GitHub logins from org manifests.
//! * **`github`**: resolves a login to a Bluesky handle/DID.
//! * **`sync`**: adds roster members to a list and/or follows them.
//! * **`unfollow`**: removes follows of low-engagement accounts.
//!
//! Everything runs on one thread with blocking I/O; pacing is done with
//! fixed sleeps.

pub mod bsky;
pub mod config;
pub mod error;
pub mod feed;
pub mod github;
pub mod logging;
pub mod puzzle;
pub mod roster;
pub mod sync;
pub mod unfollow;

pub use error::{Error, Result};
