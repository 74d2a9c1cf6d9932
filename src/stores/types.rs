//! Wire types shared by the store clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields written to the record store for one post.
///
/// Field names are camelCase on the wire to match the sheet columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFields {
    /// Post title.
    pub title: String,
    /// Slug; external identifier and asset-path namespace.
    pub post_url: String,
    /// Optional canonical link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Public URL of the video asset.
    pub video_link: String,
    /// Public URL of the thumbnail asset.
    pub feature_image: String,
    /// Comma-separated labels.
    pub labels: String,
    /// Author display name.
    pub author: String,
    /// Server-stamped publication time.
    pub published: DateTime<Utc>,
}

/// One row as returned by the record store.
///
/// Deserialization is lenient: the sheet owns these values and older rows
/// may miss columns, so everything except `rowIndex` defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// Positional identifier assigned by the remote store.
    pub row_index: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub post_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub video_link: String,
    #[serde(default)]
    pub feature_image: String,
    #[serde(default)]
    pub labels: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub published: String,
    /// View counter; incremented out of band, may lag.
    #[serde(default)]
    pub views: u64,
}

impl PostRecord {
    /// Build a record from fields plus a store-assigned row index.
    pub fn from_fields(row_index: u32, fields: &PostFields) -> Self {
        Self {
            row_index,
            title: fields.title.clone(),
            post_url: fields.post_url.clone(),
            url: fields.url.clone(),
            video_link: fields.video_link.clone(),
            feature_image: fields.feature_image.clone(),
            labels: fields.labels.clone(),
            author: fields.author.clone(),
            published: fields.published.to_rfc3339(),
            views: 0,
        }
    }
}

/// One entry in an asset-store folder listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetEntry {
    /// File or directory name.
    pub name: String,
    /// Full path within the store.
    pub path: String,
    /// Store-internal content hash; required to delete or overwrite.
    pub sha: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Entry kind (`file` or `dir`).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Direct download URL, when the store provides one.
    #[serde(default)]
    pub download_url: Option<String>,
}
