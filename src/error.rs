//! Error types shared by every tool in the crate.

use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty credentials / settings. Always fatal.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure (DNS, connect, TLS, timeout, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A non-success XRPC response from the social network.
    #[error("{endpoint} returned {status}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// A non-success response from a plain download (feed, manifest, board
    /// image).
    #[error("GET {url} returned {status}")]
    Http { url: String, status: u16 },

    /// Malformed JSON, YAML, feed XML or identifier.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// The social network rejected the request itself (4xx), as opposed to
    /// failing to answer it. Download failures never count.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Api { status, .. } if (400..500).contains(status))
    }

    /// HTTP status of a failed response, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } | Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<rss::Error> for Error {
    fn from(err: rss::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> Error {
        Error::Api {
            endpoint: "com.atproto.repo.createRecord".into(),
            status,
            message: "InvalidRequest".into(),
        }
    }

    #[test]
    fn client_errors_are_rejections() {
        assert!(api(400).is_rejection());
        assert!(api(404).is_rejection());
        assert!(!api(502).is_rejection());
        assert!(!Error::Config("x".into()).is_rejection());
    }

    #[test]
    fn failed_downloads_are_not_rejections() {
        let missing = Error::Http {
            url: "https://pbs.twimg.com/media/gone?format=png&name=900x900".into(),
            status: 404,
        };
        assert!(!missing.is_rejection());
        assert_eq!(missing.status(), Some(404));
    }

    #[test]
    fn display_names_the_endpoint() {
        let msg = api(400).to_string();
        assert_eq!(msg, "com.atproto.repo.createRecord returned 400: InvalidRequest");
    }
}
