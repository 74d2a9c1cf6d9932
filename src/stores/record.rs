//! Record store: one row per post behind a single HTTP endpoint.
//!
//! The production backend is a Google Apps Script web app fronting a
//! spreadsheet. The remote side owns ordering, row-index assignment, and
//! persistence; this client does no business validation of its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::types::{PostFields, PostRecord};

/// HTTP timeout for record-store calls.
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The remote endpoint answered with a non-success status.
    #[error("record store returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Transport-level failure talking to the store.
    #[error("record store transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for RecordError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// CRUD for post rows.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Append a new row; the remote store assigns its `rowIndex`.
    async fn create(&self, fields: &PostFields) -> Result<(), RecordError>;

    /// Replace the fields of the row at `row_index`.
    async fn update(&self, row_index: u32, fields: &PostFields) -> Result<(), RecordError>;

    /// Delete the row at `row_index`.
    async fn delete(&self, row_index: u32) -> Result<(), RecordError>;

    /// Fetch every row.
    async fn list(&self) -> Result<Vec<PostRecord>, RecordError>;

    /// Add one to the view counter of the post with slug `slug`.
    ///
    /// Dispatched fire-and-forget by the caller; lost increments are an
    /// accepted trade-off.
    async fn increment_views(&self, slug: &str) -> Result<(), RecordError>;
}

#[derive(Debug, Deserialize)]
struct SheetPayload {
    #[serde(default)]
    posts: Vec<PostRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RowUpdate<'a> {
    row_index: u32,
    #[serde(flatten)]
    fields: &'a PostFields,
}

/// Record store backed by an Apps Script web endpoint.
pub struct SheetRecordStore {
    client: reqwest::Client,
    endpoint: Url,
    key: String,
}

impl SheetRecordStore {
    /// Create a store client for `endpoint`, authenticated with the
    /// shared `key` sent as a query parameter on every call.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid URL or the HTTP
    /// client cannot be constructed.
    pub fn new(endpoint: &str, key: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("reelpress/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            key: key.into(),
        })
    }

    fn endpoint_url(&self, action: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.key);
            if let Some(action) = action {
                pairs.append_pair("action", action);
            }
        }
        url
    }

    async fn check(response: reqwest::Response) -> Result<(), RecordError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(RecordError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RecordStore for SheetRecordStore {
    async fn create(&self, fields: &PostFields) -> Result<(), RecordError> {
        let response = self
            .client
            .post(self.endpoint_url(None))
            .json(fields)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn update(&self, row_index: u32, fields: &PostFields) -> Result<(), RecordError> {
        let response = self
            .client
            .put(self.endpoint_url(None))
            .json(&RowUpdate { row_index, fields })
            .send()
            .await?;
        Self::check(response).await
    }

    async fn delete(&self, row_index: u32) -> Result<(), RecordError> {
        let response = self
            .client
            .delete(self.endpoint_url(None))
            .json(&serde_json::json!({ "rowIndex": row_index }))
            .send()
            .await?;
        Self::check(response).await
    }

    async fn list(&self) -> Result<Vec<PostRecord>, RecordError> {
        let response = self.client.get(self.endpoint_url(None)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RecordError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        let payload = response.json::<SheetPayload>().await?;
        Ok(payload.posts)
    }

    async fn increment_views(&self, slug: &str) -> Result<(), RecordError> {
        let response = self
            .client
            .post(self.endpoint_url(Some("increment_view")))
            .json(&serde_json::json!({ "slug": slug }))
            .send()
            .await?;
        Self::check(response).await
    }
}
