use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::*;
use super::Bluesky;
use crate::config::Credentials;
use crate::error::{Error, Result};

/// Logged-in, blocking XRPC client.
pub struct XrpcClient {
    http: Client,
    service: String,
    session: Session,
}

#[derive(Serialize)]
struct CreateSession<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CreateRecord<'a> {
    repo: &'a str,
    collection: &'a str,
    record: &'a Record,
}

#[derive(Serialize)]
struct DeleteRecord<'a> {
    repo: &'a str,
    collection: &'a str,
    rkey: &'a str,
}

#[derive(Deserialize)]
struct XrpcError {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct AuthorFeed {
    feed: Vec<FeedViewPost>,
    cursor: Option<String>,
}

#[derive(Deserialize)]
struct Profiles {
    profiles: Vec<ProfileViewDetailed>,
}

#[derive(Deserialize)]
struct Lists {
    lists: Vec<ListView>,
    cursor: Option<String>,
}

#[derive(Deserialize)]
struct ListItems {
    items: Vec<ListItemView>,
    cursor: Option<String>,
}

#[derive(Deserialize)]
struct Follows {
    follows: Vec<ProfileView>,
    cursor: Option<String>,
}

#[derive(Deserialize)]
struct UploadedBlob {
    blob: Blob,
}

impl XrpcClient {
    /// Open a session on `service` (e.g. `https://bsky.social`).
    pub fn login(service: &str, credentials: &Credentials) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let service = service.trim_end_matches('/').to_string();

        let nsid = "com.atproto.server.createSession";
        let response = http
            .post(format!("{service}/xrpc/{nsid}"))
            .json(&CreateSession {
                identifier: &credentials.identifier,
                password: &credentials.password,
            })
            .send()?;
        let session: Session = decode(nsid, response)?;
        debug!(did = %session.did, handle = %session.handle, "session created");

        Ok(Self {
            http,
            service,
            session,
        })
    }

    pub fn handle(&self) -> &str {
        &self.session.handle
    }

    fn url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service, nsid)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.session.access_jwt)
    }

    fn query<T: DeserializeOwned>(&self, nsid: &str, params: &[(&str, &str)]) -> Result<T> {
        let response = self.authed(self.http.get(self.url(nsid))).query(params).send()?;
        decode(nsid, response)
    }

    fn procedure<B: Serialize, T: DeserializeOwned>(&self, nsid: &str, body: &B) -> Result<T> {
        let response = self.authed(self.http.post(self.url(nsid))).json(body).send()?;
        decode(nsid, response)
    }
}

fn with_cursor<'a>(mut params: Vec<(&'a str, &'a str)>, cursor: Option<&'a str>) -> Vec<(&'a str, &'a str)> {
    if let Some(cursor) = cursor {
        params.push(("cursor", cursor));
    }
    params
}

/// Turn an XRPC response into `T`, folding error bodies into [`Error::Api`].
fn decode<T: DeserializeOwned>(nsid: &str, response: Response) -> Result<T> {
    let response = check(nsid, response)?;
    let body = response.bytes()?;
    Ok(serde_json::from_slice(&body)?)
}

fn check(nsid: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = match serde_json::from_str::<XrpcError>(&body) {
        Ok(XrpcError {
            error: Some(error),
            message: Some(message),
        }) => format!("{error}: {message}"),
        Ok(XrpcError {
            error: Some(error), ..
        }) => error,
        _ => body,
    };

    Err(Error::Api {
        endpoint: nsid.to_string(),
        status: status.as_u16(),
        message,
    })
}

impl Bluesky for XrpcClient {
    fn session_did(&self) -> &str {
        &self.session.did
    }

    fn author_feed(&self, actor: &str, cursor: Option<&str>) -> Result<Page<FeedViewPost>> {
        let params = with_cursor(vec![("actor", actor), ("limit", "100")], cursor);
        let page: AuthorFeed = self.query("app.bsky.feed.getAuthorFeed", &params)?;
        Ok(Page::new(page.feed, page.cursor))
    }

    fn profiles(&self, actors: &[&str]) -> Result<Vec<ProfileViewDetailed>> {
        let params: Vec<(&str, &str)> = actors.iter().map(|actor| ("actors", *actor)).collect();
        let page: Profiles = self.query("app.bsky.actor.getProfiles", &params)?;
        Ok(page.profiles)
    }

    fn lists(&self, actor: &str, cursor: Option<&str>) -> Result<Page<ListView>> {
        let params = with_cursor(vec![("actor", actor), ("limit", "100")], cursor);
        let page: Lists = self.query("app.bsky.graph.getLists", &params)?;
        Ok(Page::new(page.lists, page.cursor))
    }

    fn list_items(&self, list: &str, cursor: Option<&str>) -> Result<Page<ListItemView>> {
        let params = with_cursor(vec![("list", list), ("limit", "100")], cursor);
        let page: ListItems = self.query("app.bsky.graph.getList", &params)?;
        Ok(Page::new(page.items, page.cursor))
    }

    fn follows(&self, actor: &str, cursor: Option<&str>) -> Result<Page<ProfileView>> {
        let params = with_cursor(vec![("actor", actor), ("limit", "100")], cursor);
        let page: Follows = self.query("app.bsky.graph.getFollows", &params)?;
        Ok(Page::new(page.follows, page.cursor))
    }

    fn create_record(&self, record: &Record) -> Result<StrongRef> {
        self.procedure(
            "com.atproto.repo.createRecord",
            &CreateRecord {
                repo: &self.session.did,
                collection: record.collection(),
                record,
            },
        )
    }

    fn delete_record(&self, repo: &str, collection: &str, rkey: &str) -> Result<()> {
        let nsid = "com.atproto.repo.deleteRecord";
        let response = self
            .authed(self.http.post(self.url(nsid)))
            .json(&DeleteRecord {
                repo,
                collection,
                rkey,
            })
            .send()?;
        check(nsid, response)?;
        Ok(())
    }

    fn upload_blob(&self, data: Vec<u8>, mime_type: &str) -> Result<Blob> {
        let nsid = "com.atproto.repo.uploadBlob";
        let response = self
            .authed(self.http.post(self.url(nsid)))
            .header(CONTENT_TYPE, mime_type)
            .body(data)
            .send()?;
        let uploaded: UploadedBlob = decode(nsid, response)?;
        Ok(uploaded.blob)
    }
}
