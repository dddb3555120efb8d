//! Unfollow accounts with hardly any posts, followers or follows.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use bsky_bots::bsky::{Bluesky, XrpcClient};
use bsky_bots::config::{Credentials, DEFAULT_SERVICE};
use bsky_bots::logging;
use bsky_bots::unfollow::{self, SweepOptions};

#[derive(Parser)]
#[command(name = "unfollow")]
#[command(about = "Unfollow low-engagement Bluesky accounts")]
struct Cli {
    /// Bluesky service to log in to
    #[arg(long, env = "BSKY_SERVICE", default_value = DEFAULT_SERVICE)]
    service: String,

    /// Unfollow when posts, followers or follows is below this
    #[arg(long, default_value_t = 5)]
    threshold: u64,

    /// Log who would be unfollowed without unfollowing
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let credentials = Credentials::from_env()?;
    let bsky = XrpcClient::login(&cli.service, &credentials).context("Failed to log in")?;
    info!(handle = bsky.handle(), "logged in");

    let options = SweepOptions {
        threshold: cli.threshold,
        dry_run: cli.dry_run,
        ..SweepOptions::default()
    };
    let report = unfollow::sweep(&bsky, bsky.session_did(), &options)?;

    info!(
        checked = report.checked,
        unfollowed = report.unfollowed.len(),
        failed = report.failed,
        "done"
    );
    Ok(())
}
