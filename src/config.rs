//! Credentials loaded from the environment.
//!
//! A `.env` file in the working directory is honoured (via [`dotenvy`]) so
//! the tools can be run locally without exporting secrets by hand.

use std::env;
use std::fmt;

use crate::error::{Error, Result};

/// Default PDS / entryway for logins.
pub const DEFAULT_SERVICE: &str = "https://bsky.social";

/// Bluesky login identifier and app password.
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl Credentials {
    /// Read `BSKY_ID` and `BSKY_PASSWORD`. Both are required.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        match (non_empty(lookup("BSKY_ID")), non_empty(lookup("BSKY_PASSWORD"))) {
            (Some(identifier), Some(password)) => Ok(Self {
                identifier,
                password,
            }),
            _ => Err(Error::Config(
                "BSKY_ID/BSKY_PASSWORD environment variables should be set".into(),
            )),
        }
    }
}

// Keep the password out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Personal access token for the GitHub REST API.
#[derive(Clone)]
pub struct GitHubToken(String);

impl GitHubToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Read `GH_TOKEN`, falling back to `GITHUB_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        non_empty(lookup("GH_TOKEN"))
            .or_else(|| non_empty(lookup("GITHUB_TOKEN")))
            .map(Self)
            .ok_or_else(|| Error::Config("GH_TOKEN environment variable is not set".into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GitHubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GitHubToken(<redacted>)")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
