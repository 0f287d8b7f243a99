//! Archived captures of a URL.

use std::{iter, slice};

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

static TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
static DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One capture of a URL.
///
/// `timestamp` is the archive's fixed-width `YYYYMMDDHHMMSS` string, so
/// comparing two timestamps as strings orders them chronologically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub timestamp: String,
    pub original: String,
}

impl Snapshot {
    pub fn new(timestamp: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            original: original.into(),
        }
    }

    /// # Errors
    ///
    /// Fails if the timestamp is not in `YYYYMMDDHHMMSS` form.
    pub fn captured_at(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).map_err(|source| {
            Error::TimestampParse {
                timestamp: self.timestamp.clone(),
                source,
            }
        })
    }

    /// Returns `* <timestamp> | <YYYY-MM-DD HH:MM:SS> | <url>`.
    ///
    /// # Errors
    ///
    /// Fails if the timestamp cannot be parsed.
    pub fn listing_line(&self) -> Result<String> {
        let captured_at = self.captured_at()?;
        Ok(format!(
            "* {} | {} | {}",
            self.timestamp,
            captured_at.format(DISPLAY_FORMAT),
            self.original
        ))
    }
}

/// The captures of a single URL in index order, oldest first.
///
/// Never empty: the most recent capture is held separately from the rest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotList {
    earlier: Vec<Snapshot>,
    latest: Snapshot,
}

impl SnapshotList {
    /// Returns `None` if `snapshots` is empty.
    #[must_use]
    pub fn new(mut snapshots: Vec<Snapshot>) -> Option<Self> {
        let latest = snapshots.pop()?;
        Some(Self {
            earlier: snapshots,
            latest,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.earlier.len() + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> iter::Chain<slice::Iter<'_, Snapshot>, iter::Once<&Snapshot>> {
        self.earlier.iter().chain(iter::once(&self.latest))
    }

    #[must_use]
    pub fn latest(&self) -> &Snapshot {
        &self.latest
    }

    /// Returns the first capture whose timestamp is exactly `timestamp`.
    #[must_use]
    pub fn find(&self, timestamp: &str) -> Option<&Snapshot> {
        self.iter().find(|s| s.timestamp == timestamp)
    }

    /// Picks the capture to fetch: the one matching `date` if there is one,
    /// otherwise the latest.
    #[must_use]
    pub fn select(&self, date: Option<&str>) -> &Snapshot {
        match date {
            Some(date) => self.find(date).unwrap_or_else(|| {
                log::warn!(
                    "no snapshot at {}, using latest snapshot {}",
                    date,
                    self.latest.timestamp
                );
                &self.latest
            }),
            None => &self.latest,
        }
    }
}

impl<'a> IntoIterator for &'a SnapshotList {
    type Item = &'a Snapshot;
    type IntoIter = iter::Chain<slice::Iter<'a, Snapshot>, iter::Once<&'a Snapshot>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
