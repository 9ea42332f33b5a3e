//! Error types for the reposync-core crate.
//!
//! All errors carry stable string messages suitable for display in a status
//! line and for programmatic handling. Bearer tokens never appear in error
//! messages.

/// Errors that can occur during repository synchronization operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote rejected the credential (expired, revoked, or missing).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The repository or path does not exist, or the credential cannot see it.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write was rejected because the supplied revision no longer matches
    /// the current remote state.
    #[error("conflict on {path}: {message}")]
    Conflict {
        /// Path of the file whose guarded write was rejected.
        path: String,
        /// Remote-supplied failure detail.
        message: String,
    },

    /// An HTTP request failed at the transport level or with an unexpected
    /// status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The uploaded archive could not be opened or read.
    #[error("archive error: {0}")]
    Archive(String),

    /// Invalid synchronization configuration.
    #[error("config error: {0}")]
    Config(String),

    /// An operation's result arrived after a newer operation had already
    /// started for the same session, so the result was discarded.
    #[error("stale result discarded: {0}")]
    Stale(String),
}

/// Convenience type alias for reposync-core results.
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Whether this error is local to a single file rather than fatal to the
    /// whole batch operation. Per-file errors are recorded in the outcome
    /// list and never abort the remaining writes.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
