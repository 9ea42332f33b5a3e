//! Synchronization configuration with sensible defaults.
//!
//! [`SyncConfig`] controls the API endpoint, request behaviour, the tree
//! walk's fan-out, and how uploaded archives are normalized. The defaults
//! match GitHub's public API and the zip layout produced by common
//! project-export tools.

use crate::error::SyncError;

/// Default reserved path segments: generated or vendored output that must
/// never be synced back to the repository.
pub const DEFAULT_RESERVED_SEGMENTS: &[&str] = &[".next", "dist", "node_modules", "public"];

/// Configuration for one synchronization session.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. The bearer token is treated as an
/// opaque credential and attached to every remote call unchanged.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the REST API. Overridable for tests against a mock server.
    pub api_base: String,
    /// Opaque bearer credential supplied by the authentication layer.
    pub token: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum in-flight requests during the tree walk. Listings and raw
    /// content fetches within one level fan out up to this cap.
    pub concurrency: usize,
    /// Path segments excluded from uploaded archives at any nesting depth.
    pub reserved_segments: Vec<String>,
    /// A single leading folder name stripped from archive paths when
    /// present (export tools wrap the project in one top-level directory).
    /// `None` disables stripping.
    pub wrapper_prefix: Option<String>,
    /// Product tag embedded in every synthesized commit message.
    pub commit_tag: String,
    /// Custom User-Agent string. GitHub requires one on every request.
    pub user_agent: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".into(),
            token: String::new(),
            timeout_seconds: 30,
            concurrency: 8,
            reserved_segments: DEFAULT_RESERVED_SEGMENTS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            wrapper_prefix: Some("project".into()),
            commit_tag: "RepoSync".into(),
            user_agent: concat!("reposync-core/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl SyncConfig {
    /// Build a config with the given bearer token and defaults elsewhere.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `api_base` must not be empty
    /// - `timeout_seconds` must be greater than 0
    /// - `concurrency` must be greater than 0
    /// - `commit_tag` must not be empty
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.api_base.is_empty() {
            return Err(SyncError::Config("api_base must not be empty".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(SyncError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(SyncError::Config(
                "concurrency must be greater than 0".into(),
            ));
        }
        if self.commit_tag.is_empty() {
            return Err(SyncError::Config("commit_tag must not be empty".into()));
        }
        Ok(())
    }
}
