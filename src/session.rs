//! Session-scoped synchronization state.
//!
//! [`SyncSession`] owns the snapshot and upload batch for one user session
//! and drives the four operations the workflow exposes: refresh the remote
//! tree, install an uploaded archive, detect changes, push. State is held
//! explicitly rather than in ambient globals, so every operation is
//! deterministic and testable without a UI harness.
//!
//! Each state-installing operation captures a generation number when it
//! starts. A result whose generation is no longer current — because the
//! user began a newer operation while it was in flight — is discarded with
//! [`SyncError::Stale`] instead of corrupting the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::archive;
use crate::client::GitHubClient;
use crate::config::SyncConfig;
use crate::diff;
use crate::error::{Result, SyncError};
use crate::progress::{NullSink, Phase, ProgressEvent, ProgressSink};
use crate::push::{push_changes, PushReport};
use crate::tree;
use crate::types::{Batch, Change, RepoId, Snapshot};

#[derive(Debug, Default)]
struct SessionState {
    snapshot: Snapshot,
    batch: Batch,
}

/// One user's synchronization session against one repository.
///
/// The session owns its snapshot and batch exclusively; cross-session
/// sharing is out of scope. Operations take `&self` and guard their
/// installs with the generation counter, so a caller that fires a new
/// operation while an old one is suspended gets consistent state.
pub struct SyncSession {
    client: GitHubClient,
    config: SyncConfig,
    repo: RepoId,
    state: Mutex<SessionState>,
    generation: AtomicU64,
    progress: Arc<dyn ProgressSink>,
}

impl SyncSession {
    /// Create a session for `repo` with the given progress sink.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] or [`SyncError::Http`] if the client
    /// cannot be built from `config`.
    pub fn new(config: SyncConfig, repo: RepoId, progress: Arc<dyn ProgressSink>) -> Result<Self> {
        let client = GitHubClient::new(&config)?;
        Ok(Self {
            client,
            config,
            repo,
            state: Mutex::new(SessionState::default()),
            generation: AtomicU64::new(0),
            progress,
        })
    }

    /// Create a session that reports progress nowhere.
    pub fn detached(config: SyncConfig, repo: RepoId) -> Result<Self> {
        Self::new(config, repo, Arc::new(NullSink))
    }

    /// The repository this session synchronizes.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Number of files in the current snapshot.
    pub fn snapshot_len(&self) -> usize {
        self.lock().snapshot.len()
    }

    /// Number of files in the current upload batch.
    pub fn batch_len(&self) -> usize {
        self.lock().batch.len()
    }

    /// Re-read the remote tree and atomically replace the snapshot.
    ///
    /// Returns the number of files in the new snapshot.
    ///
    /// # Errors
    ///
    /// A failed read leaves the prior snapshot untouched. Returns
    /// [`SyncError::Stale`] if a newer operation started while the read
    /// was in flight; the fetched tree is discarded.
    pub async fn refresh_tree(&self) -> Result<usize> {
        let generation = self.begin();
        self.progress.emit(ProgressEvent::PhaseStarted(Phase::Fetching));
        self.progress.emit(ProgressEvent::Status(format!(
            "Fetching contents of {}...",
            self.repo
        )));

        let result = tree::read_tree(&self.client, &self.repo, "", self.config.concurrency).await;
        self.progress.emit(ProgressEvent::PhaseFinished(Phase::Fetching));

        match result {
            Ok(snapshot) => {
                if !self.is_current(generation) {
                    return Err(SyncError::Stale(
                        "tree read superseded by a newer operation".into(),
                    ));
                }
                let count = snapshot.len();
                self.lock().snapshot = snapshot;
                self.progress.emit(ProgressEvent::Status(
                    "Repository contents fetched successfully".into(),
                ));
                Ok(count)
            }
            Err(err) => {
                self.progress.emit(ProgressEvent::Status(format!(
                    "Error fetching repository: {err}"
                )));
                Err(err)
            }
        }
    }

    /// Normalize an uploaded zip archive and replace the batch wholesale.
    ///
    /// Returns the number of files in the new batch.
    ///
    /// # Errors
    ///
    /// A failed load leaves the prior batch untouched.
    pub fn install_archive(&self, bytes: &[u8]) -> Result<usize> {
        let generation = self.begin();
        self.progress
            .emit(ProgressEvent::PhaseStarted(Phase::LoadingArchive));
        self.progress
            .emit(ProgressEvent::Status("Processing zip archive...".into()));

        let result = archive::load_archive(bytes, &self.config);
        self.progress
            .emit(ProgressEvent::PhaseFinished(Phase::LoadingArchive));

        match result {
            Ok(batch) => {
                if !self.is_current(generation) {
                    return Err(SyncError::Stale(
                        "archive load superseded by a newer operation".into(),
                    ));
                }
                let count = batch.len();
                self.lock().batch = batch;
                self.progress
                    .emit(ProgressEvent::Status("Archive processed".into()));
                Ok(count)
            }
            Err(err) => {
                self.progress.emit(ProgressEvent::Status(format!(
                    "Error processing zip archive: {err}"
                )));
                Err(err)
            }
        }
    }

    /// Diff the current batch against the current snapshot.
    ///
    /// Pure read of session state; does not start a new generation.
    pub fn detect_changes(&self) -> Vec<Change> {
        let changes = {
            let state = self.lock();
            diff::diff(&state.snapshot, &state.batch)
        };
        self.progress.emit(ProgressEvent::Status(format!(
            "Found {} changes",
            changes.len()
        )));
        changes
    }

    /// Push a change list to the remote repository.
    ///
    /// Individual failures never abort the batch; see the per-change
    /// outcomes in the returned report. After the push, the snapshot
    /// entries for successfully written paths are invalidated — their
    /// stored revisions are stale until the next [`Self::refresh_tree`].
    pub async fn push(&self, changes: &[Change]) -> PushReport {
        let generation = self.begin();
        let report = push_changes(
            &self.client,
            &self.repo,
            changes,
            &self.config.commit_tag,
            self.progress.as_ref(),
        )
        .await;

        // Only touch the snapshot if no newer operation replaced it while
        // the writes were in flight.
        if self.is_current(generation) {
            let mut state = self.lock();
            for outcome in report.outcomes.iter().filter(|o| o.succeeded) {
                state.snapshot.invalidate(&outcome.path);
            }
        }
        report
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Session state is plain data; recover from a poisoned lock.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
