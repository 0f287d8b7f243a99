//! A module for reading captures from the [Wayback Machine](https://web.archive.org).

use reqwest::{header, Url};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    snapshot::{Snapshot, SnapshotList},
};

pub static DEFAULT_ARCHIVE_URL: &str = "https://web.archive.org";
static INDEX_PATH: &str = "cdx/search/cdx";

/// Source of capture indexes and capture content.
#[allow(async_fn_in_trait)]
pub trait Archive {
    type Body: ContentStream;

    /// Lists the captures of `url`, oldest first.
    async fn fetch_index(&self, url: &str) -> Result<SnapshotList>;

    /// Opens the raw body of `snapshot`. The body is read lazily and its
    /// connection is released when the returned stream is dropped.
    async fn fetch_content(&self, snapshot: &Snapshot) -> Result<Self::Body>;
}

/// A capture body, read one chunk at a time.
#[allow(async_fn_in_trait)]
pub trait ContentStream {
    /// Returns the next chunk, or `None` once the body is exhausted.
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

#[derive(Debug)]
pub struct WaybackClient<'a> {
    base_url: Url,
    client: &'a reqwest::Client,
}

impl<'a> WaybackClient<'a> {
    pub fn new(base_url: Url, client: &'a reqwest::Client) -> Self {
        Self { base_url, client }
    }
}

impl Archive for WaybackClient<'_> {
    type Body = WaybackContent;

    async fn fetch_index(&self, url: &str) -> Result<SnapshotList> {
        let api_url = build_index_url(&self.base_url, url)?;
        log::debug!("fetching snapshot index {}", api_url);

        let index_fetch_error = |source| Error::IndexFetch {
            url: url.into(),
            source,
        };
        let response = self
            .client
            .get(api_url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(index_fetch_error)?;
        let body = response.text().await.map_err(index_fetch_error)?;

        parse_index(url, &body)
    }

    async fn fetch_content(&self, snapshot: &Snapshot) -> Result<WaybackContent> {
        let content_url = build_content_url(&self.base_url, snapshot)?;
        log::debug!("fetching snapshot {}", content_url);

        let response = self
            .client
            .get(content_url)
            .header(header::ACCEPT_ENCODING, "plain")
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| content_fetch_error(snapshot, source))?;

        Ok(WaybackContent {
            response,
            snapshot: snapshot.clone(),
        })
    }
}

/// Body of a capture fetched from the Wayback Machine.
#[derive(Debug)]
pub struct WaybackContent {
    response: reqwest::Response,
    snapshot: Snapshot,
}

impl ContentStream for WaybackContent {
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>> {
        match self.response.chunk().await {
            Ok(chunk) => Ok(chunk.map(|bytes| bytes.to_vec())),
            Err(source) => Err(content_fetch_error(&self.snapshot, source)),
        }
    }
}

fn content_fetch_error(snapshot: &Snapshot, source: reqwest::Error) -> Error {
    Error::ContentFetch {
        url: snapshot.original.clone(),
        timestamp: snapshot.timestamp.clone(),
        source,
    }
}

/// A data row of the index response: `[timestamp, original]`.
#[derive(Deserialize, Debug, PartialEq)]
struct RemoteSnapshotRow(String, String);

impl From<RemoteSnapshotRow> for Snapshot {
    fn from(row: RemoteSnapshotRow) -> Self {
        Self::new(row.0, row.1)
    }
}

fn endpoint(base_url: &Url, path: &str) -> String {
    format!("{}/{}", base_url.as_str().trim_end_matches('/'), path)
}

fn build_index_url(base_url: &Url, url: &str) -> Result<Url> {
    let params = [
        ("output", "json"),
        ("url", url),
        ("fl", "timestamp,original"),
        ("collapse", "digest"),
        ("gzip", "false"),
        ("filter", "statuscode:200"),
    ];
    Url::parse_with_params(&endpoint(base_url, INDEX_PATH), &params).map_err(|source| {
        Error::RequestBuild {
            url: url.into(),
            source,
        }
    })
}

fn build_content_url(base_url: &Url, snapshot: &Snapshot) -> Result<Url> {
    let path = format!("web/{}id_/{}", snapshot.timestamp, snapshot.original);
    Url::parse(&endpoint(base_url, &path)).map_err(|source| Error::RequestBuild {
        url: snapshot.original.clone(),
        source,
    })
}

/// Decodes an index response, dropping its leading header row. Anything
/// that is not a JSON array of rows, an empty body included, is a decode
/// error.
fn parse_index(url: &str, body: &str) -> Result<SnapshotList> {
    let rows: Vec<RemoteSnapshotRow> =
        serde_json::from_str(body).map_err(|source| Error::Decode {
            url: url.into(),
            source,
        })?;
    let snapshots = rows.into_iter().skip(1).map(Snapshot::from).collect();
    SnapshotList::new(snapshots).ok_or_else(|| Error::NoSnapshots { url: url.into() })
}
