//! Sync executor: applies a computed diff to the remote store.
//!
//! Every change is attempted regardless of earlier failures — one bad file
//! never blocks the rest. A `Modified` change carries the snapshot
//! revision so the store rejects the write if the file changed remotely
//! since the snapshot was taken; an `Added` change passes no revision.
//!
//! The batch is not transactional: an abort after N of M writes leaves the
//! repository in a mixed state, because the store exposes no multi-file
//! atomic commit here. Replaying the same change list is not idempotent
//! for `Added` records that already landed — re-diff against a fresh
//! snapshot instead of reusing a stale change list.

use crate::client::GitHubClient;
use crate::progress::{Phase, ProgressEvent, ProgressSink};
use crate::types::{Change, ChangeKind, RepoId, SyncOutcome, SyncSummary};

/// Per-change outcomes plus the aggregate count for one push.
#[derive(Debug, Clone)]
pub struct PushReport {
    /// One outcome per change, in change order.
    pub outcomes: Vec<SyncOutcome>,
    /// Aggregate `{succeeded, total}`.
    pub summary: SyncSummary,
}

/// Synthesize the commit message for one file write.
fn commit_message(path: &str, tag: &str) -> String {
    format!("Update {path} [{tag}]")
}

/// Write every change to the remote repository, continuing past individual
/// failures.
///
/// Writes run sequentially to keep error attribution simple; they are
/// independent and could fan out within the remote API's rate limits.
pub async fn push_changes(
    client: &GitHubClient,
    repo: &RepoId,
    changes: &[Change],
    commit_tag: &str,
    progress: &dyn ProgressSink,
) -> PushReport {
    progress.emit(ProgressEvent::PhaseStarted(Phase::Pushing));
    progress.emit(ProgressEvent::Status(format!(
        "Pushing {} changes to {repo}...",
        changes.len()
    )));

    let mut outcomes = Vec::with_capacity(changes.len());
    let mut succeeded = 0usize;

    for change in changes {
        let message = commit_message(&change.path, commit_tag);
        let revision = match &change.kind {
            ChangeKind::Added => None,
            ChangeKind::Modified { revision } => Some(revision.as_str()),
        };

        match client
            .put_file(repo, &change.path, &message, &change.content, revision)
            .await
        {
            Ok(()) => {
                tracing::debug!(path = %change.path, kind = change.kind.label(), "change pushed");
                succeeded += 1;
                outcomes.push(SyncOutcome {
                    path: change.path.clone(),
                    succeeded: true,
                    error: None,
                });
            }
            Err(err) => {
                tracing::warn!(path = %change.path, error = %err, "failed to push change");
                outcomes.push(SyncOutcome {
                    path: change.path.clone(),
                    succeeded: false,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    let summary = SyncSummary {
        succeeded,
        total: changes.len(),
    };
    progress.emit(ProgressEvent::Status(format!(
        "Successfully pushed {summary} changes"
    )));
    progress.emit(ProgressEvent::PhaseFinished(Phase::Pushing));

    PushReport { outcomes, summary }
}
