//! Roster → Bluesky list / follow synchronization.
//!
//! Existing list items and follows are read in full up front and compared in
//! memory; nothing relies on the server to reject duplicates. Members are
//! processed in login order with a fixed pause between them. Everyone newly
//! added to the list is greeted in one announcement post at the end.

use std::collections::{BTreeSet, HashSet};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::bsky::{
    collect_pages, find_list, AtUri, Bluesky, Embed, Facet, ListView, Record, StrongRef, TextBuilder,
};
use crate::error::{Error, Result};
use crate::github::{Identity, ResolveIdentity};

pub const DEFAULT_LIST_NAME: &str = "Kubernetes Community/GitHub org members";

const SHORT_LINK: &str = "go.k8s.io/bsky";
const COMMUNITY_HANDLE: &str = "kubernetes.dev";
const COMMUNITY_DID: &str = "did:plc:v6ps63hssmxoznrgwbyxmqcx";

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Follow members the account does not follow yet.
    pub follow: bool,
    /// Add members missing from the list.
    pub list: bool,
    pub list_name: String,
    /// Pause after each member.
    pub delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            follow: false,
            list: true,
            list_name: DEFAULT_LIST_NAME.to_string(),
            delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub followed: Vec<Identity>,
    pub added: Vec<Identity>,
    pub unresolved: usize,
    pub failed: usize,
    pub announcement: Option<StrongRef>,
}

/// Existing follows, matched by DID or handle.
#[derive(Debug, Default)]
struct FollowSet {
    dids: HashSet<String>,
    handles: HashSet<String>,
}

impl FollowSet {
    fn contains(&self, identity: &Identity) -> bool {
        self.dids.contains(&identity.did) || self.handles.contains(&identity.handle)
    }

    fn insert(&mut self, identity: &Identity) {
        self.dids.insert(identity.did.clone());
        self.handles.insert(identity.handle.clone());
    }
}

pub fn synchronize<B, R>(
    bsky: &B,
    resolver: &R,
    roster: &BTreeSet<String>,
    options: &SyncOptions,
) -> Result<SyncReport>
where
    B: Bluesky + ?Sized,
    R: ResolveIdentity + ?Sized,
{
    let me = bsky.session_did().to_string();

    let list = if options.list {
        let list = find_list(bsky, &me, &options.list_name)?
            .ok_or_else(|| Error::Config(format!("list {:?} not found", options.list_name)))?;
        info!(name = %list.name, uri = %list.uri, "target list");
        Some(list)
    } else {
        None
    };

    let mut listed: HashSet<String> = match &list {
        Some(list) => collect_pages(|cursor| bsky.list_items(&list.uri, cursor))?
            .into_iter()
            .map(|item| item.subject.did)
            .collect(),
        None => HashSet::new(),
    };

    let mut following = FollowSet::default();
    if options.follow {
        for profile in collect_pages(|cursor| bsky.follows(&me, cursor))? {
            following.dids.insert(profile.did);
            following.handles.insert(profile.handle);
        }
    }
    info!(
        members = roster.len(),
        listed = listed.len(),
        following = following.dids.len(),
        "loaded existing state"
    );

    let mut report = SyncReport::default();

    // BTreeSet iterates in sorted order
    for member in roster {
        if let Some(identity) = resolve_member(resolver, member, &mut report) {
            sync_member(bsky, &identity, list.as_ref(), &mut listed, &mut following, options, &mut report);
        }
        thread::sleep(options.delay);
    }

    if let Some(list) = &list {
        if !report.added.is_empty() {
            match announce(bsky, list, &report.added) {
                Ok(posted) => {
                    info!(uri = %posted.uri, count = report.added.len(), "posted announcement");
                    report.announcement = Some(posted);
                }
                Err(err) => error!(error = ?err, "unable to post announcement"),
            }
        }
    }

    Ok(report)
}

/// `None` when the member has no linked account or could not be resolved;
/// both are counted in `report`.
fn resolve_member<R: ResolveIdentity + ?Sized>(
    resolver: &R,
    member: &str,
    report: &mut SyncReport,
) -> Option<Identity> {
    match resolver.resolve(member) {
        Ok(Some(identity)) => Some(identity),
        Ok(None) => {
            report.unresolved += 1;
            None
        }
        Err(err) => {
            warn!(member, error = %err, "unable to resolve");
            report.failed += 1;
            None
        }
    }
}

fn sync_member<B: Bluesky + ?Sized>(
    bsky: &B,
    identity: &Identity,
    list: Option<&ListView>,
    listed: &mut HashSet<String>,
    following: &mut FollowSet,
    options: &SyncOptions,
    report: &mut SyncReport,
) {
    if options.follow {
        if following.contains(identity) {
            debug!(member = %identity.member, handle = %identity.handle, "already following");
        } else {
            match bsky.create_record(&Record::follow(&identity.did)) {
                Ok(_) => {
                    info!(member = %identity.member, handle = %identity.handle, did = %identity.did, "followed");
                    following.insert(identity);
                    report.followed.push(identity.clone());
                }
                Err(err) => {
                    warn!(member = %identity.member, error = %err, "unable to follow");
                    report.failed += 1;
                }
            }
        }
    }

    if let Some(list) = list {
        if listed.contains(&identity.did) {
            debug!(member = %identity.member, handle = %identity.handle, "already on list");
        } else {
            match bsky.create_record(&Record::list_item(&identity.did, &list.uri)) {
                Ok(_) => {
                    info!(member = %identity.member, handle = %identity.handle, did = %identity.did, "added to list");
                    listed.insert(identity.did.clone());
                    report.added.push(identity.clone());
                }
                Err(err) => {
                    warn!(member = %identity.member, error = %err, "unable to add to list");
                    report.failed += 1;
                }
            }
        }
    }
}

/// Web URL of a list, e.g. `https://bsky.app/profile/<did>/lists/<rkey>`.
pub fn list_web_url(list_uri: &str) -> Result<String> {
    let uri: AtUri = list_uri.parse()?;
    Ok(format!("https://bsky.app/profile/{}/lists/{}", uri.repo, uri.rkey))
}

/// Announcement greeting every newly added member:
///
/// ```text
/// Hi! @a.bsky.social @b.dev  - added you to go.k8s.io/bsky (list for k8s GitHub org members).
///
/// @kubernetes.dev #kubernetes
/// ```
pub fn compose_announcement(list: &ListView, added: &[Identity]) -> Result<(String, Vec<Facet>)> {
    let mut tb = TextBuilder::new();
    tb.text("Hi! ");
    for identity in added {
        tb.mention(&format!("@{}", identity.handle), &identity.did).text(" ");
    }
    tb.text(" - added you to ")
        .link(SHORT_LINK, &list_web_url(&list.uri)?)
        .text(" (list for k8s GitHub org members).")
        .text("\n\n")
        .mention(&format!("@{COMMUNITY_HANDLE}"), COMMUNITY_DID)
        .text(" ")
        .tag("#kubernetes", "kubernetes");
    Ok(tb.build())
}

fn announce<B: Bluesky + ?Sized>(bsky: &B, list: &ListView, added: &[Identity]) -> Result<StrongRef> {
    let (text, facets) = compose_announcement(list, added)?;
    let embed = Embed::Record {
        record: StrongRef {
            uri: list.uri.clone(),
            cid: list.cid.clone(),
        },
    };
    bsky.create_record(&Record::post(text, facets, Some(embed)))
}
