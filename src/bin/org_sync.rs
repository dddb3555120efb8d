//! Add GitHub org members with a linked Bluesky account to a list and/or
//! follow them.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::blocking::Client;
use tracing::info;

use bsky_bots::bsky::XrpcClient;
use bsky_bots::config::{Credentials, GitHubToken, DEFAULT_SERVICE};
use bsky_bots::github::{GitHubClient, LinkedAccountResolver};
use bsky_bots::logging;
use bsky_bots::roster::{self, KUBERNETES_ORG_MANIFESTS};
use bsky_bots::sync::{self, SyncOptions, DEFAULT_LIST_NAME};

#[derive(Parser)]
#[command(name = "org-sync")]
#[command(about = "Sync GitHub org members to a Bluesky list and follows")]
struct Cli {
    /// Bluesky service to log in to
    #[arg(long, env = "BSKY_SERVICE", default_value = DEFAULT_SERVICE)]
    service: String,

    /// Follow members that are not followed yet
    #[arg(short, long)]
    follow: bool,

    /// Do not add members to the list
    #[arg(short, long)]
    skip_list: bool,

    /// Name of the account's list to add members to
    #[arg(long, default_value = DEFAULT_LIST_NAME)]
    list_name: String,

    /// Org manifest URL (repeatable); defaults to the Kubernetes org manifests
    #[arg(long = "manifest")]
    manifests: Vec<String>,

    /// Pause between members, in milliseconds
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let credentials = Credentials::from_env()?;
    let token = GitHubToken::from_env()?;

    let manifests = if cli.manifests.is_empty() {
        KUBERNETES_ORG_MANIFESTS.iter().map(|url| url.to_string()).collect()
    } else {
        cli.manifests
    };
    let http = Client::new();
    let members = roster::fetch_roster(&http, &manifests);

    let bsky = XrpcClient::login(&cli.service, &credentials).context("Failed to log in")?;
    info!(handle = bsky.handle(), "logged in");

    let resolver = LinkedAccountResolver::new(GitHubClient::new(&token)?, &bsky);
    let options = SyncOptions {
        follow: cli.follow,
        list: !cli.skip_list,
        list_name: cli.list_name,
        delay: Duration::from_millis(cli.delay_ms),
    };
    let report = sync::synchronize(&bsky, &resolver, &members, &options)?;

    info!(
        followed = report.followed.len(),
        added = report.added.len(),
        unresolved = report.unresolved,
        failed = report.failed,
        "done"
    );
    Ok(())
}
