//! # reposync-core
//!
//! Client-side GitHub repository synchronization: snapshot a remote
//! repository's file tree over the REST content API, normalize an uploaded
//! zip archive into a comparable file set, compute the added/modified
//! diff, and push the diff back file-by-file.
//!
//! ## Design
//!
//! - The tree reader walks directories with an explicit worklist and a
//!   bounded concurrent fan-out, and installs snapshots atomically
//! - The diff is a pure, deterministic function: exact byte equality,
//!   batch order preserved, deletions never emitted (sync is
//!   additive/overwrite-only by design)
//! - Pushes are guarded per file by the snapshot's revision token and
//!   tolerate partial failure — one conflicting file never blocks the rest
//! - [`SyncSession`] holds snapshot and batch explicitly and discards
//!   results superseded by a newer operation via a generation counter
//!
//! ## Security
//!
//! - The bearer credential is opaque input, attached to every request and
//!   never logged or inspected
//! - Archive paths are normalized and traversal components rejected
//! - Request detail is logged at trace level only

pub mod archive;
pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod progress;
pub mod push;
pub mod session;
pub mod tree;
pub mod types;

pub use client::GitHubClient;
pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use progress::{NullSink, Phase, ProgressEvent, ProgressSink, StatusLine};
pub use push::PushReport;
pub use session::SyncSession;
pub use types::{
    Batch, Change, ChangeKind, RemoteFile, RepoId, Snapshot, SyncOutcome, SyncSummary,
    UploadedFile,
};

/// Read a repository's full file tree into a [`Snapshot`].
///
/// Convenience wrapper that builds a one-shot client from `config`. Pass an
/// empty `start_path` for the repository root.
///
/// # Errors
///
/// Fails whole: any listing or content fetch error aborts the read and no
/// partial snapshot is returned.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> reposync_core::Result<()> {
/// let config = reposync_core::SyncConfig::with_token("ghs_token");
/// let repo = reposync_core::RepoId::parse("octocat/hello-world", None)?;
/// let snapshot = reposync_core::read_tree(&config, &repo, "").await?;
/// println!("{} files", snapshot.len());
/// # Ok(())
/// # }
/// ```
pub async fn read_tree(
    config: &SyncConfig,
    repo: &RepoId,
    start_path: &str,
) -> Result<Snapshot> {
    let client = GitHubClient::new(config)?;
    tree::read_tree(&client, repo, start_path, config.concurrency).await
}

/// Normalize an uploaded zip archive into a [`Batch`].
///
/// See [`archive::load_archive`] for the per-entry rules.
///
/// # Errors
///
/// Returns [`SyncError::Archive`] if the container cannot be read.
pub fn load_archive(bytes: &[u8], config: &SyncConfig) -> Result<Batch> {
    archive::load_archive(bytes, config)
}

/// Compute the changes needed to make the remote match the batch.
///
/// Pure function of its inputs; see [`diff::diff`].
pub fn compute_diff(snapshot: &Snapshot, batch: &Batch) -> Vec<Change> {
    diff::diff(snapshot, batch)
}

/// Apply a change list to the remote repository.
///
/// The only mutating operation. Builds a one-shot client from `config` and
/// writes each change in order, continuing past individual failures.
///
/// Revisions stored in a snapshot are stale for every path that was
/// successfully written. [`SyncSession::push`] invalidates them
/// automatically; callers managing their own [`Snapshot`] must re-read
/// before diffing again.
///
/// # Errors
///
/// Returns an error only if the client cannot be constructed; per-file
/// write failures are reported in the [`PushReport`] instead.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> reposync_core::Result<()> {
/// let config = reposync_core::SyncConfig::with_token("ghs_token");
/// let repo = reposync_core::RepoId::parse("octocat/hello-world", None)?;
/// let snapshot = reposync_core::read_tree(&config, &repo, "").await?;
/// let batch = reposync_core::load_archive(&std::fs::read("upload.zip").unwrap(), &config)?;
/// let changes = reposync_core::compute_diff(&snapshot, &batch);
/// let report = reposync_core::sync(&config, &repo, &changes).await?;
/// println!("pushed {}", report.summary);
/// # Ok(())
/// # }
/// ```
pub async fn sync(config: &SyncConfig, repo: &RepoId, changes: &[Change]) -> Result<PushReport> {
    let client = GitHubClient::new(config)?;
    Ok(push::push_changes(&client, repo, changes, &config.commit_tag, &NullSink).await)
}
