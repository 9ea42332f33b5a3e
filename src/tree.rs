//! Remote tree reader.
//!
//! Walks a repository's directory tree through the content-listing
//! capability and produces a complete [`Snapshot`]. The walk uses an
//! explicit worklist rather than recursion: each round drains the pending
//! directories, lists them concurrently up to the configured cap, queues
//! any subdirectories found, and records files for a later content fetch.
//! File contents come from a second, raw-accept request because the
//! listing call returns only metadata for large files.
//!
//! The read is all-or-nothing: any fetch failure aborts the invocation and
//! discards everything gathered so far, so a half-built snapshot is never
//! observable.

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::client::{DirEntry, EntryKind, GitHubClient, Listing};
use crate::error::Result;
use crate::types::{RemoteFile, RepoId, Snapshot};

/// Read every regular file reachable from `start_path` (empty string for
/// the repository root) into a fresh [`Snapshot`].
///
/// `concurrency` caps in-flight requests for both directory listings and
/// raw content fetches. The merge into the snapshot is a disjoint union —
/// paths are globally unique — so completion order does not matter.
///
/// # Errors
///
/// Any listing or content fetch failure fails the whole read; no partial
/// snapshot is returned. The caller's previous snapshot, if any, is
/// untouched and the caller decides whether to retry.
pub async fn read_tree(
    client: &GitHubClient,
    repo: &RepoId,
    start_path: &str,
    concurrency: usize,
) -> Result<Snapshot> {
    let concurrency = concurrency.max(1);
    let mut pending_dirs = vec![start_path.to_owned()];
    let mut files: Vec<DirEntry> = Vec::new();

    while !pending_dirs.is_empty() {
        let level: Vec<String> = std::mem::take(&mut pending_dirs);
        tracing::trace!(dirs = level.len(), "listing directory level");

        let listings: Vec<Listing> = stream::iter(level)
            .map(|dir| async move { client.list(repo, &dir).await })
            .buffer_unordered(concurrency)
            .try_collect()
            .await?;

        for listing in listings {
            match listing {
                // The start path itself may name a regular file.
                Listing::File(entry) => files.push(entry),
                Listing::Directory(entries) => {
                    for entry in entries {
                        match entry.kind {
                            EntryKind::File => files.push(entry),
                            EntryKind::Dir => pending_dirs.push(entry.path),
                            EntryKind::Other(ref tag) => {
                                tracing::trace!(path = %entry.path, tag = %tag, "skipping non-regular entry");
                            }
                        }
                    }
                }
            }
        }
    }

    let snapshot: Snapshot = stream::iter(files)
        .map(|entry| async move {
            let content = client.fetch_raw(repo, &entry.path).await?;
            Ok(RemoteFile {
                path: entry.path,
                content,
                revision: entry.revision,
            })
        })
        .buffer_unordered(concurrency)
        .try_collect::<Vec<RemoteFile>>()
        .await?
        .into_iter()
        .collect();

    tracing::debug!(%repo, files = snapshot.len(), "tree read complete");
    Ok(snapshot)
}
