//! Core types for snapshots, upload batches, and computed changes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, SyncError};

/// Identifies one remote repository as `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// Account or organization that owns the repository.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoId {
    /// Create a repository identifier from its two components.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse user input of the form `"owner/repo"`, or a bare `"repo"`
    /// combined with `default_owner` (the signed-in account).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] for empty input, more than one `/`,
    /// or a bare name without a default owner to fall back on.
    pub fn parse(input: &str, default_owner: Option<&str>) -> Result<Self> {
        let parts: Vec<&str> = input.split('/').map(str::trim).collect();
        match parts.as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
                Ok(Self::new(*owner, *repo))
            }
            [repo] if !repo.is_empty() => match default_owner {
                Some(owner) if !owner.is_empty() => Ok(Self::new(owner, *repo)),
                _ => Err(SyncError::Config(format!(
                    "bare repository name '{repo}' requires a default owner"
                ))),
            },
            _ => Err(SyncError::Config(format!(
                "invalid repository name '{input}': use 'owner/repo' or 'repo'"
            ))),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// One file as last observed on the remote store.
///
/// Created during a tree read and replaced wholesale on every re-fetch,
/// never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Repository-relative path, unique within a snapshot.
    pub path: String,
    /// Decoded file text at fetch time.
    pub content: String,
    /// Opaque content-identity token (blob SHA) issued by the remote store.
    /// Required to perform a safe overwrite.
    pub revision: String,
}

/// Flat map of remote repository paths to their last-fetched state.
///
/// A snapshot is only ever installed whole: the tree reader either returns
/// a complete snapshot or an error, never a partial one.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    files: HashMap<String, RemoteFile>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a file by repository-relative path.
    pub fn get(&self, path: &str) -> Option<&RemoteFile> {
        self.files.get(path)
    }

    /// Insert a file, replacing any previous entry at the same path.
    pub fn insert(&mut self, file: RemoteFile) {
        self.files.insert(file.path.clone(), file);
    }

    /// Drop a file's entry. Used to invalidate a revision after a
    /// successful overwrite: the stored token is stale until a re-fetch.
    pub fn invalidate(&mut self, path: &str) -> Option<RemoteFile> {
        self.files.remove(path)
    }

    /// Number of files in the snapshot.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the snapshot contains no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over files in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &RemoteFile> {
        self.files.values()
    }
}

impl FromIterator<RemoteFile> for Snapshot {
    fn from_iter<I: IntoIterator<Item = RemoteFile>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for file in iter {
            snapshot.insert(file);
        }
        snapshot
    }
}

/// One file from the uploaded archive, path already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Normalized path: wrapper prefix stripped, forward slashes, unique
    /// within a batch.
    pub path: String,
    /// Decoded text payload.
    pub content: String,
}

/// Insertion-ordered flat map of archive-derived paths to decoded content.
///
/// A batch belongs to exactly one archive load; the next upload rebuilds
/// it from scratch rather than merging.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    entries: Vec<UploadedFile>,
    index: HashMap<String, usize>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by normalized path.
    pub fn get(&self, path: &str) -> Option<&UploadedFile> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    /// Insert an entry. A duplicate path replaces the earlier content but
    /// keeps its original position, so iteration order stays the archive's
    /// entry order.
    pub fn insert(&mut self, file: UploadedFile) {
        match self.index.get(&file.path) {
            Some(&i) => self.entries[i] = file,
            None => {
                self.index.insert(file.path.clone(), self.entries.len());
                self.entries.push(file);
            }
        }
    }

    /// Number of entries in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in archive insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &UploadedFile> {
        self.entries.iter()
    }
}

impl FromIterator<UploadedFile> for Batch {
    fn from_iter<I: IntoIterator<Item = UploadedFile>>(iter: I) -> Self {
        let mut batch = Self::new();
        for file in iter {
            batch.insert(file);
        }
        batch
    }
}

/// How an uploaded path differs from the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// The path does not exist remotely.
    Added,
    /// The path exists remotely with different content. Carries the
    /// snapshot revision so the write can be guarded against concurrent
    /// remote edits.
    Modified {
        /// Revision token captured when the snapshot was taken.
        revision: String,
    },
}

impl ChangeKind {
    /// Short human-readable label, as shown next to each change.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified { .. } => "modified",
        }
    }
}

/// One computed difference between a [`Snapshot`] and a [`Batch`].
///
/// The diff contains exactly one change per path whose content differs;
/// a path with identical content in both produces no change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Path being created or overwritten.
    pub path: String,
    /// Classification, with the guard revision for overwrites.
    pub kind: ChangeKind,
    /// New content to write.
    pub content: String,
}

/// Result of applying one [`Change`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Path the write targeted.
    pub path: String,
    /// Whether the write landed.
    pub succeeded: bool,
    /// Failure reason when `succeeded` is false.
    pub error: Option<String>,
}

/// Aggregate result of one push. The batch may be partially successful;
/// one bad file never blocks the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Number of writes that landed.
    pub succeeded: usize,
    /// Number of changes attempted.
    pub total: usize,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} out of {}", self.succeeded, self.total)
    }
}
