//! Low-engagement unfollow sweep.
//!
//! Every account the logged-in user follows is checked against its public
//! counters; if any of posts, followers or follows is under the threshold
//! the follow record is deleted. A failed delete costs a fixed backoff and
//! the sweep moves on to the next account.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bsky::{collect_pages, AtUri, Bluesky, ProfileView, ProfileViewDetailed, FOLLOW_COLLECTION};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub threshold: u64,
    /// Pause after each delete.
    pub delay: Duration,
    /// Pause after a failed delete.
    pub backoff: Duration,
    pub dry_run: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            threshold: 5,
            delay: Duration::from_millis(100),
            backoff: Duration::from_secs(5),
            dry_run: false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub unfollowed: Vec<String>,
    pub failed: usize,
}

/// Whether a profile is under `threshold` on any counter. A missing profile
/// or counter counts as zero.
pub fn below_threshold(profile: Option<&ProfileViewDetailed>, threshold: u64) -> bool {
    let Some(p) = profile else {
        return true;
    };
    [p.posts_count, p.followers_count, p.follows_count]
        .iter()
        .any(|count| count.unwrap_or(0) < threshold)
}

pub fn sweep<B: Bluesky + ?Sized>(bsky: &B, actor: &str, options: &SweepOptions) -> Result<SweepReport> {
    let follows = collect_pages(|cursor| bsky.follows(actor, cursor))?;
    info!(count = follows.len(), "loaded follows");

    let mut report = SweepReport::default();
    for followed in &follows {
        let Some(record) = follow_record(followed) else {
            continue;
        };
        report.checked += 1;

        let profile = match bsky.profiles(&[followed.handle.as_str()]) {
            Ok(profiles) => profiles.into_iter().next(),
            Err(err) => {
                warn!(handle = %followed.handle, error = %err, "unable to fetch profile");
                report.failed += 1;
                continue;
            }
        };
        if !below_threshold(profile.as_ref(), options.threshold) {
            continue;
        }

        info!(handle = %followed.handle, repo = %record.repo, rkey = %record.rkey, "unfollowing");
        if options.dry_run {
            report.unfollowed.push(followed.handle.clone());
            continue;
        }

        match bsky.delete_record(&record.repo, FOLLOW_COLLECTION, &record.rkey) {
            Ok(()) => report.unfollowed.push(followed.handle.clone()),
            Err(err) => {
                warn!(handle = %followed.handle, error = %err, "unfollow failed, snoozing");
                report.failed += 1;
                thread::sleep(options.backoff);
            }
        }
        thread::sleep(options.delay);
    }

    Ok(report)
}

/// The viewer's follow record for `profile`, if the viewer follows it.
fn follow_record(profile: &ProfileView) -> Option<AtUri> {
    let uri = profile.viewer.following.as_deref()?;
    match uri.parse() {
        Ok(record) => Some(record),
        Err(err) => {
            debug!(handle = %profile.handle, error = %err, "unparseable follow reference");
            None
        }
    }
}
