//! Minimal GitHub REST content-API client.
//!
//! Wraps a configured [`reqwest::Client`] with the three capabilities the
//! sync engine consumes: path listing, raw content fetch, and a guarded
//! create-or-update write. The bearer credential is attached to every call
//! and never inspected.

use base64::Engine as _;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::types::RepoId;

/// GitHub REST API version pinned on every request.
const API_VERSION: &str = "2022-11-28";

/// Accept header for JSON metadata responses.
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Accept header for raw file content. Used for the second, content-only
/// fetch because the listing call returns only metadata for large files.
const ACCEPT_RAW: &str = "application/vnd.github.raw";

/// A directory entry's type tag, modelled exhaustively rather than matched
/// as an ad-hoc string at each consumption site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A subdirectory.
    Dir,
    /// Symlinks, submodules, and anything the API grows later. Skipped by
    /// the tree reader.
    Other(String),
}

impl From<&str> for EntryKind {
    fn from(tag: &str) -> Self {
        match tag {
            "file" => Self::File,
            "dir" => Self::Dir,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// One entry returned by a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Entry name within its directory.
    pub name: String,
    /// Repository-relative path.
    pub path: String,
    /// Blob SHA: the opaque revision token guarding overwrites.
    pub revision: String,
    /// File, directory, or other.
    pub kind: EntryKind,
}

/// Result of listing a repository path: the contents API returns either a
/// single file descriptor or an array of directory entries.
#[derive(Debug, Clone)]
pub enum Listing {
    /// The path named a regular file.
    File(DirEntry),
    /// The path named a directory.
    Directory(Vec<DirEntry>),
}

#[derive(Debug, Deserialize)]
struct EntryWire {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

// The contents endpoint is polymorphic: an object for a file path, an
// array for a directory path.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsWire {
    Entries(Vec<EntryWire>),
    Single(EntryWire),
}

#[derive(Debug, Deserialize)]
struct ApiErrorWire {
    message: Option<String>,
}

impl From<EntryWire> for DirEntry {
    fn from(wire: EntryWire) -> Self {
        let kind = EntryKind::from(wire.kind.as_str());
        Self {
            name: wire.name,
            path: wire.path,
            revision: wire.sha,
            kind,
        }
    }
}

/// Authenticated client for one repository host.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl GitHubClient {
    /// Build a client from the session configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the configuration is invalid and
    /// [`SyncError::Http`] if the underlying client cannot be constructed.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SyncError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        })
    }

    /// List a repository path: a single file descriptor or the entries of a
    /// directory. An empty `path` lists the repository root.
    ///
    /// # Errors
    ///
    /// [`SyncError::Auth`] on 401/403, [`SyncError::NotFound`] on 404,
    /// [`SyncError::Http`] for transport failures and unexpected statuses.
    pub async fn list(&self, repo: &RepoId, path: &str) -> Result<Listing> {
        tracing::trace!(%repo, path, "list contents");

        let response = self
            .request(reqwest::Method::GET, repo, path)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .send()
            .await
            .map_err(|e| SyncError::Http(format!("list {repo}/{path}: {e}")))?;

        let response = Self::check_status(response, repo, path).await?;

        let wire: ContentsWire = response
            .json()
            .await
            .map_err(|e| SyncError::Http(format!("list {repo}/{path}: bad response body: {e}")))?;

        Ok(match wire {
            ContentsWire::Entries(entries) => {
                Listing::Directory(entries.into_iter().map(DirEntry::from).collect())
            }
            ContentsWire::Single(entry) => Listing::File(entry.into()),
        })
    }

    /// Fetch a file's raw decoded content.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`GitHubClient::list`].
    pub async fn fetch_raw(&self, repo: &RepoId, path: &str) -> Result<String> {
        tracing::trace!(%repo, path, "fetch raw content");

        let response = self
            .request(reqwest::Method::GET, repo, path)
            .header(reqwest::header::ACCEPT, ACCEPT_RAW)
            .send()
            .await
            .map_err(|e| SyncError::Http(format!("fetch {repo}/{path}: {e}")))?;

        let response = Self::check_status(response, repo, path).await?;

        response
            .text()
            .await
            .map_err(|e| SyncError::Http(format!("fetch {repo}/{path}: body read failed: {e}")))
    }

    /// Create or update one file with a synthesized commit.
    ///
    /// `revision` must be the previously captured blob SHA when overwriting
    /// an existing file; the store rejects the write if the file changed
    /// since. Pass `None` when creating a new file.
    ///
    /// # Errors
    ///
    /// [`SyncError::Conflict`] when the revision is stale (409/422), plus
    /// the taxonomy of [`GitHubClient::list`].
    pub async fn put_file(
        &self,
        repo: &RepoId,
        path: &str,
        message: &str,
        content: &str,
        revision: Option<&str>,
    ) -> Result<()> {
        tracing::trace!(%repo, path, guarded = revision.is_some(), "put file");

        let encoded = base64::engine::general_purpose::STANDARD.encode(content.as_bytes());
        let mut body = serde_json::json!({
            "message": message,
            "content": encoded,
        });
        if let Some(sha) = revision {
            body["sha"] = serde_json::Value::String(sha.to_owned());
        }

        let response = self
            .request(reqwest::Method::PUT, repo, path)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Http(format!("put {repo}/{path}: {e}")))?;

        let status = response.status();
        if status.as_u16() == 409 || status.as_u16() == 422 {
            let message = Self::error_message(response).await;
            return Err(SyncError::Conflict {
                path: path.to_owned(),
                message,
            });
        }

        Self::check_status(response, repo, path).await?;
        Ok(())
    }

    fn request(&self, method: reqwest::Method, repo: &RepoId, path: &str) -> reqwest::RequestBuilder {
        let url = self.contents_url(repo, path);
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Build `{api_base}/repos/{owner}/{repo}/contents/{path}` with each
    /// path segment escaped but the separators kept.
    fn contents_url(&self, repo: &RepoId, path: &str) -> String {
        let mut url = format!(
            "{}/repos/{}/{}/contents",
            self.api_base,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo),
        );
        if !path.is_empty() {
            let escaped: Vec<String> = path
                .split('/')
                .map(|seg| urlencoding::encode(seg).into_owned())
                .collect();
            url.push('/');
            url.push_str(&escaped.join("/"));
        }
        url
    }

    async fn check_status(
        response: reqwest::Response,
        repo: &RepoId,
        path: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = Self::error_message(response).await;
        Err(match status.as_u16() {
            401 | 403 => SyncError::Auth(message),
            404 => SyncError::NotFound(format!("{repo}/{path}: {message}")),
            _ => SyncError::Http(format!("{repo}/{path}: {status}: {message}")),
        })
    }

    /// Best-effort extraction of the API's error `message` field.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ApiErrorWire>().await {
            Ok(ApiErrorWire {
                message: Some(message),
            }) => message,
            _ => status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GitHubClient {
        let config = SyncConfig {
            api_base: "https://api.github.com/".into(),
            token: "ghs_test".into(),
            ..Default::default()
        };
        GitHubClient::new(&config).expect("client builds")
    }

    #[test]
    fn entry_kind_from_tag() {
        assert_eq!(EntryKind::from("file"), EntryKind::File);
        assert_eq!(EntryKind::from("dir"), EntryKind::Dir);
        assert_eq!(
            EntryKind::from("symlink"),
            EntryKind::Other("symlink".into())
        );
    }

    #[test]
    fn contents_url_root_has_no_trailing_slash() {
        let client = test_client();
        let repo = RepoId::new("octocat", "hello");
        assert_eq!(
            client.contents_url(&repo, ""),
            "https://api.github.com/repos/octocat/hello/contents"
        );
    }

    #[test]
    fn contents_url_escapes_segments_but_not_separators() {
        let client = test_client();
        let repo = RepoId::new("octocat", "hello");
        assert_eq!(
            client.contents_url(&repo, "src/my file.rs"),
            "https://api.github.com/repos/octocat/hello/contents/src/my%20file.rs"
        );
    }

    #[test]
    fn directory_listing_deserializes() {
        let json = r#"[
            {"name": "a.txt", "path": "a.txt", "sha": "r1", "type": "file"},
            {"name": "src", "path": "src", "sha": "r2", "type": "dir"}
        ]"#;
        let wire: ContentsWire = serde_json::from_str(json).expect("parse");
        match wire {
            ContentsWire::Entries(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].sha, "r1");
                assert_eq!(entries[1].kind, "dir");
            }
            ContentsWire::Single(_) => panic!("expected directory listing"),
        }
    }

    #[test]
    fn single_file_deserializes() {
        let json = r#"{"name": "a.txt", "path": "a.txt", "sha": "r1", "type": "file",
                       "content": "aGVsbG8=", "encoding": "base64"}"#;
        let wire: ContentsWire = serde_json::from_str(json).expect("parse");
        match wire {
            ContentsWire::Single(entry) => {
                assert_eq!(entry.path, "a.txt");
                assert_eq!(EntryKind::from(entry.kind.as_str()), EntryKind::File);
            }
            ContentsWire::Entries(_) => panic!("expected single file"),
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = SyncConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(GitHubClient::new(&config).is_err());
    }
}
