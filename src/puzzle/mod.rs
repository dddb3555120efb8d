//! "Mate in 2" cross-poster.
//!
//! ```text
//! feed::poll ─► classify ─► dedup::is_duplicate ─► poster::post
//!                                                     │
//!                                          media::ImageSource (fetch + re-encode)
//! ```
//!
//! Every candidate is independent: a failure to fetch, encode or submit one
//! puzzle is logged and the rest of the batch carries on.

pub mod dedup;
pub mod media;
pub mod poster;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::bsky::Bluesky;
use crate::error::Result;
use crate::feed::{posting_order, FeedEntry};

use self::media::ImageSource;

lazy_static! {
    static ref PUZZLE_TITLE: Regex = Regex::new(r"(?i)mate(s)? in 2").unwrap();
    static ref POST_ID: Regex = Regex::new(r"/status/(\d+)").unwrap();
    // Media paths are percent-encoded inside the summary HTML.
    static ref IMAGE_ID: Regex = Regex::new(r"media%2F([^.]+)\.").unwrap();
}

/// A feed entry that is a puzzle and carries everything needed to post it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entry_id: String,
    pub post_id: String,
    pub image_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    NotAPuzzle,
    /// Puzzle title, but the post id or image id could not be extracted.
    Unparseable {
        post_id: Option<String>,
        image_id: Option<String>,
    },
    Candidate(Candidate),
}

pub fn classify(entry: &FeedEntry) -> Classification {
    if !PUZZLE_TITLE.is_match(&entry.title) {
        return Classification::NotAPuzzle;
    }

    let post_id = POST_ID
        .captures(&entry.id)
        .map(|caps| caps[1].to_string());
    let image_id = IMAGE_ID
        .captures(entry.summary())
        .map(|caps| caps[1].to_string());

    match (post_id, image_id) {
        (Some(post_id), Some(image_id)) => Classification::Candidate(Candidate {
            entry_id: entry.id.clone(),
            post_id,
            image_id,
            title: entry.title.clone(),
        }),
        (post_id, image_id) => Classification::Unparseable { post_id, image_id },
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub posted: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Post every new puzzle in `entries` to the logged-in account.
///
/// `actor` is the account whose own feed is checked for earlier cross-posts.
/// With `dry_run` nothing is uploaded or created.
pub fn run<B: Bluesky>(
    bsky: &B,
    images: &dyn ImageSource,
    actor: &str,
    mut entries: Vec<FeedEntry>,
    dry_run: bool,
) -> Result<Summary> {
    let existing = dedup::own_posts(bsky, actor)?;
    info!(count = existing.len(), "loaded own posts");

    posting_order(&mut entries);

    let mut summary = Summary::default();
    for entry in &entries {
        let candidate = match classify(entry) {
            Classification::NotAPuzzle => continue,
            Classification::Unparseable { post_id, image_id } => {
                warn!(entry = %entry.id, ?post_id, ?image_id, "skipping, unable to parse");
                summary.skipped += 1;
                continue;
            }
            Classification::Candidate(candidate) => candidate,
        };

        if dedup::is_duplicate(&candidate.post_id, &existing) {
            debug!(entry = %candidate.entry_id, "skipping, already present");
            summary.duplicates += 1;
            continue;
        }

        if dry_run {
            info!(entry = %candidate.entry_id, title = %candidate.title, "would post");
            summary.posted += 1;
            continue;
        }

        match poster::post(bsky, images, &candidate) {
            Ok(posted) => {
                info!(entry = %candidate.entry_id, uri = %posted.uri, "posted");
                summary.posted += 1;
            }
            Err(err) if err.is_rejection() => {
                error!(entry = %candidate.entry_id, error = ?err, "post rejected");
                summary.failed += 1;
            }
            Err(err) => {
                error!(entry = %candidate.entry_id, error = %err, "unable to post");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsky::testing::{api_error, profile_view, FakeBluesky};
    use crate::bsky::{FeedViewPost, PostView, Record};
    use crate::error::Error;
    use serde_json::json;
    use std::cell::RefCell;

    struct FakeImages {
        fetched: RefCell<Vec<String>>,
        fail_for: Option<&'static str>,
    }

    impl FakeImages {
        fn new() -> Self {
            Self {
                fetched: RefCell::new(Vec::new()),
                fail_for: None,
            }
        }
    }

    impl ImageSource for FakeImages {
        fn fetch_png(&self, image_id: &str) -> Result<Vec<u8>> {
            self.fetched.borrow_mut().push(image_id.to_string());
            if self.fail_for == Some(image_id) {
                return Err(Error::Http {
                    url: format!("https://pbs.twimg.com/media/{image_id}"),
                    status: 404,
                });
            }
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    fn entry(id: &str, title: &str, summary: Option<&str>) -> FeedEntry {
        FeedEntry {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.map(String::from),
            published: None,
        }
    }

    fn puzzle(post_id: &str, image_id: &str) -> FeedEntry {
        entry(
            &format!("https://nitter.example/ImShahinyan/status/{post_id}#m"),
            "White to play, mate in 2",
            Some(format!(r#"<img src="https://nitter.example/pic/media%2F{image_id}.jpg">"#).as_str()),
        )
    }

    #[test]
    fn classify_matches_title_case_insensitively() {
        for title in ["Mate in 2", "WHITE MATES IN 2!", "black mate in 2"] {
            let e = entry("https://x/status/1", title, Some("media%2Fabc.jpg"));
            assert!(matches!(classify(&e), Classification::Candidate(_)), "{title}");
        }
        for title in ["Mate in 3", "checkmate", "Puzzle of the day"] {
            let e = entry("https://x/status/1", title, Some("media%2Fabc.jpg"));
            assert_eq!(classify(&e), Classification::NotAPuzzle, "{title}");
        }
    }

    #[test]
    fn classify_extracts_ids() {
        let Classification::Candidate(candidate) = classify(&puzzle("1870001", "GfAbC123")) else {
            panic!("expected a candidate");
        };
        assert_eq!(candidate.post_id, "1870001");
        assert_eq!(candidate.image_id, "GfAbC123");
        assert_eq!(candidate.title, "White to play, mate in 2");
    }

    #[test]
    fn classify_reports_missing_ids() {
        let no_image = entry("https://x/status/42#m", "Mate in 2", Some("<p>text only</p>"));
        assert_eq!(
            classify(&no_image),
            Classification::Unparseable {
                post_id: Some("42".into()),
                image_id: None
            }
        );

        let no_status = entry("https://x/i/web/42", "Mate in 2", Some("media%2Fabc.png"));
        assert_eq!(
            classify(&no_status),
            Classification::Unparseable {
                post_id: None,
                image_id: Some("abc".into())
            }
        );
    }

    #[test]
    fn run_only_posts_parseable_puzzles() {
        let bsky = FakeBluesky::default();
        let images = FakeImages::new();
        let entries = vec![
            entry("https://x/status/1#m", "Good morning", Some("media%2Fa.jpg")),
            entry("https://x/status/2#m", "Mate in 2", None),
            puzzle("3", "img3"),
        ];

        let summary = run(&bsky, &images, "me", entries, false).unwrap();

        assert_eq!(summary.posted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(*images.fetched.borrow(), vec!["img3".to_string()]);
        assert_eq!(bsky.created_records().len(), 1);
    }

    #[test]
    fn run_skips_already_posted_puzzles() {
        let bsky = FakeBluesky {
            feed_pages: vec![vec![FeedViewPost {
                post: PostView {
                    uri: "at://did:plc:self/app.bsky.feed.post/1".into(),
                    cid: "bafy".into(),
                    author: profile_view("me.bsky.social", "did:plc:self"),
                    record: json!({
                        "text": "mate in 2 puzzle from @ImShahinyan",
                        "facets": [{
                            "index": { "byteStart": 22, "byteEnd": 34 },
                            "features": [{
                                "$type": "app.bsky.richtext.facet#link",
                                "uri": "https://x.com/ImShahinyan/status/12345"
                            }]
                        }]
                    }),
                },
            }]],
            ..Default::default()
        };
        let images = FakeImages::new();

        let summary = run(&bsky, &images, "me", vec![puzzle("12345", "img")], false).unwrap();

        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.posted, 0);
        assert!(bsky.created_records().is_empty());
        assert!(images.fetched.borrow().is_empty());
    }

    #[test]
    fn run_continues_after_a_failed_candidate() {
        let bsky = FakeBluesky::default();
        bsky.create_failures.borrow_mut().push_back(Some(api_error(400)));
        let images = FakeImages {
            fetched: RefCell::new(Vec::new()),
            fail_for: Some("broken"),
        };
        // newest first, as the feed lists them; processed oldest first
        let entries = vec![puzzle("3", "fine"), puzzle("2", "rejected"), puzzle("1", "broken")];

        let summary = run(&bsky, &images, "me", entries, false).unwrap();

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.posted, 1);
        let created = bsky.created_records();
        assert_eq!(created.len(), 1);
        let Record::Post(post) = &created[0] else {
            panic!("expected a post record");
        };
        assert!(post.facets.iter().any(|f| format!("{:?}", f.features).contains("/status/3")));
    }

    #[test]
    fn dry_run_creates_nothing() {
        let bsky = FakeBluesky::default();
        let images = FakeImages::new();

        let summary = run(&bsky, &images, "me", vec![puzzle("9", "img")], true).unwrap();

        assert_eq!(summary.posted, 1);
        assert!(bsky.created_records().is_empty());
        assert!(bsky.uploads.borrow().is_empty());
    }
}
