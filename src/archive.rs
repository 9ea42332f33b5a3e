//! Uploaded-archive normalizer.
//!
//! Turns a zip payload into a flat [`Batch`] of text files keyed by
//! normalized path: directory markers dropped, generated/vendored paths
//! excluded, the export tool's wrapper folder stripped, and each payload
//! decoded as UTF-8. Re-running on a new archive replaces the previous
//! batch wholesale.

use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::types::{Batch, UploadedFile};

/// Load and normalize an uploaded zip archive into a [`Batch`].
///
/// Per-entry rules, in order:
///
/// 1. Directory markers are skipped.
/// 2. Entries with a reserved path segment at any depth are skipped
///    (matching is segment-aware: `a/node_modules/b.js` is excluded,
///    `a/node_modules_extra/b.js` is not).
/// 3. A leading wrapper-prefix segment is stripped from the key.
/// 4. The payload is decoded as UTF-8; an entry that fails to decode is
///    skipped with a warning rather than aborting the load.
///
/// Batch order is the archive's entry order.
///
/// # Errors
///
/// Returns [`SyncError::Archive`] if the container itself cannot be opened
/// or an entry's bytes cannot be read. Individual decode failures never
/// abort the load.
pub fn load_archive(bytes: &[u8], config: &SyncConfig) -> Result<Batch> {
    config.validate()?;

    let mut zip = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SyncError::Archive(format!("failed to open zip archive: {e}")))?;

    let mut batch = Batch::new();
    let mut skipped = 0usize;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| SyncError::Archive(format!("failed to read zip entry {index}: {e}")))?;

        if entry.is_dir() || entry.name().ends_with('/') {
            continue;
        }

        let Some(path) = normalize_entry_path(entry.name()) else {
            tracing::warn!(name = %entry.name(), "skipping unsafe archive path");
            skipped += 1;
            continue;
        };

        if has_reserved_segment(&path, &config.reserved_segments) {
            tracing::trace!(path = %path, "skipping reserved path");
            continue;
        }

        let path = strip_wrapper_prefix(&path, config.wrapper_prefix.as_deref());

        let mut raw = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut raw)
            .map_err(|e| SyncError::Archive(format!("failed to read entry '{path}': {e}")))?;

        match String::from_utf8(raw) {
            Ok(content) => batch.insert(UploadedFile { path, content }),
            Err(_) => {
                tracing::warn!(path = %path, "skipping non-UTF-8 entry");
                skipped += 1;
            }
        }
    }

    tracing::debug!(files = batch.len(), skipped, "archive normalized");
    Ok(batch)
}

/// Normalize a zip entry name into a clean repository-relative path.
///
/// Backslashes become forward slashes and a leading `./` or `/` is
/// dropped. Returns `None` for paths that escape the archive root or
/// collapse to nothing.
fn normalize_entry_path(name: &str) -> Option<String> {
    let unified = name.replace('\\', "/");
    let trimmed = unified
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_owned();

    if trimmed.is_empty() {
        return None;
    }
    if trimmed.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return None;
    }
    Some(trimmed)
}

/// Whether any `/`-separated component of `path` equals a reserved name.
fn has_reserved_segment(path: &str, reserved: &[String]) -> bool {
    path.split('/')
        .any(|segment| reserved.iter().any(|r| r == segment))
}

/// Strip one leading `prefix` segment when the path continues past it.
/// A file literally named like the prefix is left alone.
fn strip_wrapper_prefix(path: &str, prefix: Option<&str>) -> String {
    if let Some(prefix) = prefix {
        if let Some(rest) = path.strip_prefix(prefix) {
            if let Some(rest) = rest.strip_prefix('/') {
                if !rest.is_empty() {
                    return rest.to_owned();
                }
            }
        }
    }
    path.to_owned()
}
