//! Cross-post new "mate in 2" puzzles from the feed to Bluesky.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use bsky_bots::bsky::{Bluesky, XrpcClient};
use bsky_bots::config::{Credentials, DEFAULT_SERVICE};
use bsky_bots::feed::{self, RssSource};
use bsky_bots::logging;
use bsky_bots::puzzle::{self, media::MediaCdn};

const DEFAULT_FEED: &str = "https://nitter.privacydev.net/ImShahinyan/rss";

#[derive(Parser)]
#[command(name = "mate-in-2")]
#[command(about = "Cross-post mate-in-2 chess puzzles to Bluesky")]
struct Cli {
    /// Bluesky service to log in to
    #[arg(long, env = "BSKY_SERVICE", default_value = DEFAULT_SERVICE)]
    service: String,

    /// RSS feed with the puzzle posts
    #[arg(long, default_value = DEFAULT_FEED)]
    feed_url: String,

    /// Log what would be posted without posting
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let credentials = Credentials::from_env()?;
    let bsky = XrpcClient::login(&cli.service, &credentials).context("Failed to log in")?;
    info!(handle = bsky.handle(), "logged in");

    let source = RssSource::new(&cli.feed_url, "ImShahinyan")?;
    let entries = feed::poll(&source);

    let images = MediaCdn::new()?;
    let summary = puzzle::run(&bsky, &images, bsky.session_did(), entries, cli.dry_run)
        .context("Failed to read own posts")?;

    info!(
        posted = summary.posted,
        duplicates = summary.duplicates,
        skipped = summary.skipped,
        failed = summary.failed,
        "done"
    );
    Ok(())
}
