//! RSS feed source.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

use super::{DataSource, FeedEntry};
use crate::error::{Error, Result};

/// Browser-like headers; the mirror the puzzles come from rejects obvious
/// bots.
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,it;q=0.8";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// An RSS 2.0 feed fetched over HTTP and parsed with the [`rss`] crate.
pub struct RssSource {
    pub url: String,
    pub label: String,
    http: Client,
}

impl RssSource {
    /// Create a source that sends browser-like request headers.
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            url: url.into(),
            label: label.into(),
            http,
        })
    }

    /// Parse an already-fetched [`rss::Channel`] into [`FeedEntry`]s.
    ///
    /// Pure, so tests can exercise it without the network.
    pub fn parse_channel(channel: &rss::Channel) -> Vec<FeedEntry> {
        channel
            .items()
            .iter()
            .map(|item| {
                // Prefer <guid>, fall back to <link>, then empty string.
                let id = item
                    .guid()
                    .map(|g| g.value().to_string())
                    .or_else(|| item.link().map(String::from))
                    .unwrap_or_default();

                let published = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                FeedEntry {
                    id,
                    title: item.title().unwrap_or_default().to_string(),
                    summary: item.description().map(String::from),
                    published,
                }
            })
            .collect()
    }
}

impl DataSource for RssSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch(&self) -> Result<Vec<FeedEntry>> {
        let response = self.http.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes()?;
        let channel = rss::Channel::read_from(body.as_ref())?;
        Ok(Self::parse_channel(&channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_channel_extracts_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>ImShahinyan</title>
    <item>
      <title>White mates in 2</title>
      <link>https://nitter.example/ImShahinyan/status/1870001#m</link>
      <guid>https://nitter.example/ImShahinyan/status/1870001#m</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate>
      <description>&lt;img src="https://nitter.example/pic/media%2FGfAbC123.jpg" /&gt;</description>
    </item>
    <item>
      <title>Second</title>
      <link>https://nitter.example/ImShahinyan/status/1870002#m</link>
    </item>
  </channel>
</rss>"#;

        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        let entries = RssSource::parse_channel(&channel);

        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].id, "https://nitter.example/ImShahinyan/status/1870001#m");
        assert_eq!(entries[0].title, "White mates in 2");
        assert!(entries[0].summary().contains("media%2FGfAbC123.jpg"));
        assert!(entries[0].published.is_some());

        // no <guid>: id falls back to <link>
        assert_eq!(entries[1].id, "https://nitter.example/ImShahinyan/status/1870002#m");
        assert!(entries[1].summary.is_none());
        assert!(entries[1].published.is_none());
    }

    #[test]
    fn handles_missing_title_and_invalid_date() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <guid>g1</guid>
      <pubDate>not-a-real-date</pubDate>
    </item>
  </channel>
</rss>"#;

        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        let entries = RssSource::parse_channel(&channel);

        assert_eq!(entries[0].title, "");
        assert!(entries[0].published.is_none());
    }

    #[test]
    fn name_returns_label() {
        let src = RssSource::new("http://example.com/feed", "puzzles").unwrap();
        assert_eq!(src.name(), "puzzles");
    }
}
