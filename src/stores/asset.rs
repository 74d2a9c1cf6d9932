//! Asset store: binary objects addressed by path.
//!
//! The production backend is the GitHub contents API: one repository holds
//! every media file, and the raw-content CDN serves them publicly. The
//! store needs an object's `sha` to overwrite or delete it, so writes and
//! deletes are preceded by a metadata read.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::AssetEntry;

/// Branch that serves raw content.
const ASSET_BRANCH: &str = "main";

/// HTTP timeout for asset-store calls; uploads can be large.
const HTTP_TIMEOUT_SECS: u64 = 120;

/// Asset store failures.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The remote store rejected a write (e.g. oversized payload).
    /// Never retried; surfaced to the caller.
    #[error("asset write failed for '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    /// Object absent where the operation assumes presence.
    #[error("asset not found: {path}")]
    NotFound { path: String },

    /// Transport-level failure talking to the store.
    #[error("asset store transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for AssetError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Binary object store addressed by path.
///
/// Implementations must be thread-safe (`Send + Sync`) for use behind
/// `Arc<dyn AssetStore>`.
#[async_trait]
pub trait AssetStore: Send + Sync + 'static {
    /// Store an object, overwriting any existing object at `path`.
    ///
    /// Returns the public URL of the stored object.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::WriteFailed`] when the remote store rejects
    /// the write; the failure is never silently retried.
    async fn put(&self, path: &str, content: &[u8]) -> Result<String, AssetError>;

    /// Delete an object. Idempotent: an absent object is a success.
    ///
    /// Deleting a stale asset is best-effort cleanup, not a correctness
    /// requirement of the surrounding workflow; remote delete failures
    /// are logged and swallowed by the production backend.
    async fn delete(&self, path: &str) -> Result<(), AssetError>;

    /// List the entries directly under `folder`.
    async fn list(&self, folder: &str) -> Result<Vec<AssetEntry>, AssetError>;

    /// Move an object to a new path (read, write, delete the original).
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] when no object exists at `old_path`.
    async fn rename(&self, old_path: &str, new_path: &str) -> Result<(), AssetError>;
}

/// Subset of the contents-API object metadata we read back.
#[derive(Debug, Deserialize)]
struct RemoteObject {
    sha: String,
    #[serde(default)]
    content: String,
}

/// Error body shape of the contents API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Asset store backed by the GitHub contents API.
pub struct GitHubAssetStore {
    client: reqwest::Client,
    token: String,
    owner: String,
    repo: String,
}

impl GitHubAssetStore {
    /// Create a store client for `owner/repo` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reelpress/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/contents/{path}",
            self.owner, self.repo
        )
    }

    /// Public URL an object is served from after a successful write.
    fn raw_url(&self, path: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{ASSET_BRANCH}/{path}",
            self.owner, self.repo
        )
    }

    /// Fetch the current object at `path`, or `None` if absent.
    async fn fetch_object(&self, path: &str) -> Result<Option<RemoteObject>, AssetError> {
        let response = self
            .client
            .get(self.contents_url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if response.status().is_success() {
            Ok(Some(response.json::<RemoteObject>().await?))
        } else {
            Ok(None)
        }
    }

    async fn write_object(
        &self,
        path: &str,
        base64_content: &str,
        sha: Option<&str>,
        message: String,
    ) -> Result<(), AssetError> {
        let mut body = serde_json::json!({
            "message": message,
            "content": base64_content,
        });
        if let Some(sha) = sha {
            body["sha"] = serde_json::Value::String(sha.to_string());
        }

        let response = self
            .client
            .put(self.contents_url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let reason = remote_message(response).await;
            return Err(AssetError::WriteFailed {
                path: path.to_string(),
                reason,
            });
        }
        Ok(())
    }

    /// Issue the delete call for a known `sha`. Failures are logged and
    /// swallowed; see [`AssetStore::delete`].
    async fn delete_object(&self, path: &str, sha: &str) {
        let result = self
            .client
            .delete(self.contents_url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&serde_json::json!({
                "message": format!("Delete {path}"),
                "sha": sha,
            }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(%path, "Deleted asset");
            },
            Ok(response) => {
                let status = response.status();
                let reason = remote_message(response).await;
                warn!(target: "audit", event_type = "asset_cleanup_failed", %path, %status, %reason, "Asset delete rejected; skipping");
            },
            Err(err) => {
                warn!(target: "audit", event_type = "asset_cleanup_failed", %path, %err, "Asset delete failed; skipping");
            },
        }
    }
}

#[async_trait]
impl AssetStore for GitHubAssetStore {
    async fn put(&self, path: &str, content: &[u8]) -> Result<String, AssetError> {
        // A prior read captures the sha so an existing object becomes an
        // update instead of a rejected blind create.
        let existing = self.fetch_object(path).await?;
        let message = match existing {
            Some(_) => format!("Update {path}"),
            None => format!("Upload {path}"),
        };
        let sha = existing.map(|object| object.sha);

        self.write_object(path, &BASE64.encode(content), sha.as_deref(), message)
            .await?;
        Ok(self.raw_url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), AssetError> {
        let Some(object) = self.fetch_object(path).await.unwrap_or_else(|err| {
            warn!(target: "audit", event_type = "asset_cleanup_failed", %path, %err, "Asset lookup before delete failed; skipping");
            None
        }) else {
            // Already gone: deletion is satisfied.
            return Ok(());
        };

        self.delete_object(path, &object.sha).await;
        Ok(())
    }

    async fn list(&self, folder: &str) -> Result<Vec<AssetEntry>, AssetError> {
        let response = self
            .client
            .get(self.contents_url(folder))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound {
                path: folder.to_string(),
            });
        }
        if !status.is_success() {
            return Err(AssetError::Transport(remote_message(response).await));
        }

        Ok(response.json::<Vec<AssetEntry>>().await?)
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> Result<(), AssetError> {
        let object = self
            .fetch_object(old_path)
            .await?
            .ok_or_else(|| AssetError::NotFound {
                path: old_path.to_string(),
            })?;

        // Copy first so the store never transiently lacks the object,
        // then retire the original best-effort.
        self.write_object(
            new_path,
            &object.content,
            None,
            format!("Rename {old_path} to {new_path}"),
        )
        .await?;
        self.delete_object(old_path, &object.sha).await;
        Ok(())
    }
}

/// Extract the error message from a failed contents-API response.
async fn remote_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ApiErrorBody>().await {
        Ok(body) if !body.message.is_empty() => body.message,
        _ => format!("HTTP {status}"),
    }
}
