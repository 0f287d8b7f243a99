//! Writes listings and capture content for each configured URL.

use std::io::Write;

use crate::{
    config::{Config, Mode},
    error::Result,
    snapshot::{Snapshot, SnapshotList},
    wayback::{Archive, ContentStream},
};

/// Processes every configured URL in order.
///
/// A failure to fetch one URL's index or content is logged and the next URL
/// is processed. Fatal errors (see [`crate::error::Error::is_fatal`]) stop
/// the run and are returned.
///
/// # Errors
///
/// Fails on a malformed capture timestamp while listing, or if `out` cannot
/// be written.
pub async fn run<A: Archive>(archive: &A, config: &Config, out: &mut impl Write) -> Result<()> {
    for url in &config.urls {
        if config.show_separators() {
            writeln!(out, "// Snapshots for {}", url)?;
        }

        match process_url(archive, url, &config.mode, out).await {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => log::error!("{}", e),
        }
    }

    Ok(())
}

async fn process_url<A: Archive>(
    archive: &A,
    url: &str,
    mode: &Mode,
    out: &mut impl Write,
) -> Result<()> {
    let snapshots = archive.fetch_index(url).await?;
    log::debug!("found {} snapshots for {}", snapshots.len(), url);

    match mode {
        Mode::ListSnapshots => write_listing(&snapshots, out),
        Mode::FetchAll => {
            for snapshot in &snapshots {
                match copy_content(archive, snapshot, out).await {
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => log::error!("{}", e),
                }
            }
            Ok(())
        }
        Mode::FetchSelected { date } => {
            let snapshot = snapshots.select(date.as_deref());
            copy_content(archive, snapshot, out).await.map(|_| ())
        }
    }
}

fn write_listing(snapshots: &SnapshotList, out: &mut impl Write) -> Result<()> {
    let lines = snapshots
        .iter()
        .map(Snapshot::listing_line)
        .collect::<Result<Vec<_>>>()?;
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Streams the body of `snapshot` to `out`, returning the number of bytes
/// written. The body is dropped before returning on every path.
async fn copy_content<A: Archive>(
    archive: &A,
    snapshot: &Snapshot,
    out: &mut impl Write,
) -> Result<u64> {
    let mut body = archive.fetch_content(snapshot).await?;
    let mut written = 0;
    while let Some(chunk) = body.chunk().await? {
        out.write_all(&chunk)?;
        written += chunk.len() as u64;
    }
    out.flush()?;
    log::debug!(
        "wrote {} bytes of snapshot {} ({})",
        written,
        snapshot.timestamp,
        snapshot.original
    );
    Ok(written)
}
