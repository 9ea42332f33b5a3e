//! Snapshot-versus-batch diff engine.
//!
//! A pure function of its two inputs: deterministic, batch-ordered, exact
//! byte equality. Deletions (paths present only in the snapshot) are never
//! emitted — synchronization is additive/overwrite-only.

use crate::types::{Batch, Change, ChangeKind, Snapshot};

/// Classify every uploaded path against the snapshot.
///
/// For each batch entry, in batch insertion order:
///
/// - absent from the snapshot → [`ChangeKind::Added`]
/// - present with byte-for-byte different content → [`ChangeKind::Modified`],
///   carrying the snapshot revision for the guarded write
/// - present with identical content → no change emitted
///
/// Equality is exact string comparison; no whitespace normalization, no
/// semantic diffing.
pub fn diff(snapshot: &Snapshot, batch: &Batch) -> Vec<Change> {
    let mut changes = Vec::new();

    for uploaded in batch.iter() {
        match snapshot.get(&uploaded.path) {
            None => changes.push(Change {
                path: uploaded.path.clone(),
                kind: ChangeKind::Added,
                content: uploaded.content.clone(),
            }),
            Some(remote) if remote.content != uploaded.content => changes.push(Change {
                path: uploaded.path.clone(),
                kind: ChangeKind::Modified {
                    revision: remote.revision.clone(),
                },
                content: uploaded.content.clone(),
            }),
            Some(_) => {}
        }
    }

    tracing::debug!(changes = changes.len(), batch = batch.len(), "diff computed");
    changes
}
