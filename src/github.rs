//! GitHub login → Bluesky identity.
//!
//! GitHub exposes the social accounts a user linked on their profile. The
//! Bluesky entry's URL ends in a handle or DID, which the social network's
//! own profile lookup turns into the canonical handle/DID pair. Nothing is
//! cached; every run resolves every member again.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::bsky::Bluesky;
use crate::config::GitHubToken;
use crate::error::{Error, Result};

const GITHUB_API: &str = "https://api.github.com";
const BLUESKY_PROVIDER: &str = "bluesky";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SocialAccount {
    pub provider: String,
    pub url: String,
}

/// A member's resolved Bluesky account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub member: String,
    pub handle: String,
    pub did: String,
}

/// Resolves roster members to Bluesky identities. `Ok(None)` means the
/// member has no (resolvable) linked account.
pub trait ResolveIdentity {
    fn resolve(&self, member: &str) -> Result<Option<Identity>>;
}

pub struct GitHubClient {
    http: Client,
    base: String,
}

impl GitHubClient {
    pub fn new(token: &GitHubToken) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|_| Error::Config("GH_TOKEN is not a valid header value".into()))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            base: GITHUB_API.to_string(),
        })
    }

    /// `GET /users/{user}/social_accounts`. A 404 (unknown user) is an empty
    /// list; any other failure status is logged and also treated as empty.
    pub fn social_accounts(&self, user: &str) -> Result<Vec<SocialAccount>> {
        let url = format!("{}/users/{}/social_accounts", self.base, user);
        let response = self.http.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;
        social_accounts_from(user, status, &body)
    }
}

fn social_accounts_from(user: &str, status: StatusCode, body: &str) -> Result<Vec<SocialAccount>> {
    match status {
        StatusCode::OK => Ok(serde_json::from_str(body)?),
        StatusCode::NOT_FOUND => Ok(Vec::new()),
        status => {
            warn!(user, status = status.as_u16(), "social accounts lookup failed");
            Ok(Vec::new())
        }
    }
}

/// The handle or DID at the end of the first linked Bluesky profile URL.
pub fn bluesky_actor(accounts: &[SocialAccount]) -> Option<&str> {
    accounts
        .iter()
        .filter(|account| account.provider == BLUESKY_PROVIDER)
        .filter_map(|account| account.url.trim_end_matches('/').rsplit('/').next())
        .find(|actor| !actor.is_empty())
}

/// Resolves through GitHub's linked accounts, then the Bluesky profile
/// lookup.
pub struct LinkedAccountResolver<'a, B: Bluesky> {
    github: GitHubClient,
    bsky: &'a B,
}

impl<'a, B: Bluesky> LinkedAccountResolver<'a, B> {
    pub fn new(github: GitHubClient, bsky: &'a B) -> Self {
        Self { github, bsky }
    }
}

impl<B: Bluesky> ResolveIdentity for LinkedAccountResolver<'_, B> {
    fn resolve(&self, member: &str) -> Result<Option<Identity>> {
        let accounts = self.github.social_accounts(member)?;
        let Some(actor) = bluesky_actor(&accounts) else {
            debug!(member, "no linked bluesky account");
            return Ok(None);
        };
        lookup_identity(self.bsky, member, actor)
    }
}

/// Canonical handle/DID for `actor` as the social network reports it.
pub fn lookup_identity<B: Bluesky + ?Sized>(bsky: &B, member: &str, actor: &str) -> Result<Option<Identity>> {
    let profile = bsky.profiles(&[actor])?.into_iter().next();
    if profile.is_none() {
        debug!(member, actor, "linked bluesky profile not found");
    }
    Ok(profile.map(|p| Identity {
        member: member.to_string(),
        handle: p.handle,
        did: p.did,
    }))
}
