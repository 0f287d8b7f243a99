//! wb error types.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to build request for {url}: {source}")]
    RequestBuild {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to fetch snapshot index: {source} url: {url}")]
    IndexFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode snapshot index: {source} url: {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no snapshots found for url: {url}")]
    NoSnapshots { url: String },
    #[error("failed to fetch snapshot {timestamp}: {source} url: {url}")]
    ContentFetch {
        url: String,
        timestamp: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to parse snapshot timestamp {timestamp}: {source}")]
    TimestampParse {
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("failed to read input: {0}")]
    Stdin(#[source] io::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl Error {
    /// Whether the error should abort the whole run rather than just the URL
    /// being processed.
    ///
    /// Timestamp parse failures mean the archive returned data that breaks
    /// its own format, so they are escalated along with local I/O failures.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::TimestampParse { .. } | Self::Stdin(_) | Self::Output(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
