//! Post workflows: create, update, delete.
//!
//! Each mutating request is a short linear pipeline over the two stores
//! with compensating steps on failure, not a general saga. Ordering
//! invariant: asset-store mutations always precede the corresponding
//! record-store mutation on create/update, and record deletion is
//! attempted unconditionally on delete even when asset cleanup failed —
//! the record store is the canonical "this post exists" signal.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use super::paths;
use crate::error::Result;
use crate::stores::{AssetStore, PostFields, PostRecord, RecordStore};

/// A binary payload plus the client-side file name it arrived with.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Input for the create workflow.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub post_url: String,
    pub url: Option<String>,
    pub labels: String,
    pub author: String,
    pub video: AssetUpload,
    pub thumbnail: AssetUpload,
}

/// Input for the update workflow.
///
/// `video_link` / `feature_image` carry the existing asset URLs; a new
/// upload replaces the corresponding one and retires the old path.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub row_index: u32,
    pub title: String,
    pub post_url: String,
    pub url: Option<String>,
    pub labels: String,
    pub author: String,
    pub video_link: String,
    pub feature_image: String,
    pub new_video: Option<AssetUpload>,
    pub old_video_path: Option<String>,
    pub new_thumbnail: Option<AssetUpload>,
    pub old_thumbnail_path: Option<String>,
    /// Publication time to write; when absent the stored value is kept.
    pub published: Option<DateTime<Utc>>,
}

/// Input for the delete workflow.
#[derive(Debug, Clone)]
pub struct PostDelete {
    pub row_index: u32,
    pub video_path: Option<String>,
    pub thumbnail_path: Option<String>,
}

/// Combines the asset and record stores into the post workflows.
pub struct PostOrchestrator {
    assets: Arc<dyn AssetStore>,
    records: Arc<dyn RecordStore>,
}

impl PostOrchestrator {
    pub fn new(assets: Arc<dyn AssetStore>, records: Arc<dyn RecordStore>) -> Self {
        Self { assets, records }
    }

    /// Fetch the full record list.
    pub async fn list(&self) -> Result<Vec<PostRecord>> {
        Ok(self.records.list().await?)
    }

    /// Create a post: write both assets, then the record.
    ///
    /// If either asset write fails the whole request fails; no
    /// compensation is attempted for a partially written asset from a
    /// failed create, since no record ever references it.
    pub async fn create(&self, post: NewPost) -> Result<PostFields> {
        let video_path = paths::video_path(&post.post_url, &post.video.file_name)?;
        let thumbnail_path = paths::thumbnail_path(&post.post_url, &post.thumbnail.file_name)?;

        let video_link = self.assets.put(&video_path, &post.video.bytes).await?;
        let feature_image = self
            .assets
            .put(&thumbnail_path, &post.thumbnail.bytes)
            .await?;

        let fields = PostFields {
            title: post.title,
            post_url: post.post_url,
            url: post.url,
            video_link,
            feature_image,
            labels: post.labels,
            author: post.author,
            published: Utc::now(),
        };
        self.records.create(&fields).await?;

        info!(post_url = %fields.post_url, "Created post");
        Ok(fields)
    }

    /// Update a post: resolve each asset independently, then the record.
    ///
    /// An update never re-stamps `published`: when the request carries no
    /// explicit value the one already stored on the row is kept.
    pub async fn update(&self, update: PostUpdate) -> Result<PostFields> {
        let published = match update.published {
            Some(published) => published,
            None => self.stored_published(update.row_index).await?,
        };

        let video_link = match update.new_video {
            Some(upload) => {
                let path = paths::video_path(&update.post_url, &upload.file_name)?;
                self.replace_asset(&path, &upload.bytes, update.old_video_path.as_deref())
                    .await?
            },
            None => update.video_link,
        };
        let feature_image = match update.new_thumbnail {
            Some(upload) => {
                let path = paths::thumbnail_path(&update.post_url, &upload.file_name)?;
                self.replace_asset(&path, &upload.bytes, update.old_thumbnail_path.as_deref())
                    .await?
            },
            None => update.feature_image,
        };

        let fields = PostFields {
            title: update.title,
            post_url: update.post_url,
            url: update.url,
            video_link,
            feature_image,
            labels: update.labels,
            author: update.author,
            published,
        };
        self.records.update(update.row_index, &fields).await?;

        info!(row_index = update.row_index, post_url = %fields.post_url, "Updated post");
        Ok(fields)
    }

    /// Delete a post: retire both assets best-effort, then the record.
    pub async fn delete(&self, request: PostDelete) -> Result<()> {
        if let Some(path) = &request.video_path {
            self.cleanup(path).await;
        }
        if let Some(path) = &request.thumbnail_path {
            self.cleanup(path).await;
        }

        self.records.delete(request.row_index).await?;
        info!(row_index = request.row_index, "Deleted post");
        Ok(())
    }

    /// Upload new content for one asset slot, then retire the old path.
    ///
    /// Delete-after-upload ordering guarantees the store never
    /// transiently has zero valid copies of the post's media.
    async fn replace_asset(
        &self,
        new_path: &str,
        bytes: &[u8],
        old_path: Option<&str>,
    ) -> Result<String> {
        let url = self.assets.put(new_path, bytes).await?;
        if let Some(old_path) = old_path {
            // The rebuilt path equals the old one when neither the slug
            // nor the file name changed; the put above already replaced
            // the content, and deleting would remove the fresh upload.
            if old_path != new_path {
                self.cleanup(old_path).await;
            }
        }
        Ok(url)
    }

    /// Publication time already stored for `row_index`. Falls back to now
    /// for rows that predate the column or hold an unparseable value.
    async fn stored_published(&self, row_index: u32) -> Result<DateTime<Utc>> {
        let rows = self.records.list().await?;
        Ok(rows
            .iter()
            .find(|row| row.row_index == row_index)
            .and_then(|row| DateTime::parse_from_rfc3339(&row.published).ok())
            .map(|published| published.with_timezone(&Utc))
            .unwrap_or_else(Utc::now))
    }

    /// Best-effort asset deletion. Failures are logged, never propagated:
    /// deletion is cleanup, not a correctness gate.
    async fn cleanup(&self, path: &str) {
        if let Err(err) = self.assets.delete(path).await {
            warn!(target: "audit", event_type = "asset_cleanup_failed", %path, %err, "Asset cleanup failed; continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::error::Error;
    use crate::stores::{MemoryAssetStore, MemoryRecordStore, call_log, calls};

    struct Harness {
        orchestrator: PostOrchestrator,
        assets: Arc<MemoryAssetStore>,
        records: Arc<MemoryRecordStore>,
        log: crate::stores::CallLog,
    }

    fn harness() -> Harness {
        let log = call_log();
        let assets = Arc::new(MemoryAssetStore::with_log(log.clone()));
        let records = Arc::new(MemoryRecordStore::with_log(log.clone()));
        let orchestrator = PostOrchestrator::new(assets.clone(), records.clone());
        Harness {
            orchestrator,
            assets,
            records,
            log,
        }
    }

    fn new_post(slug: &str) -> NewPost {
        NewPost {
            title: format!("Post {slug}"),
            post_url: slug.to_string(),
            url: None,
            labels: "travel".to_string(),
            author: "admin".to_string(),
            video: AssetUpload {
                file_name: "clip.mp4".to_string(),
                bytes: b"video-bytes".to_vec(),
            },
            thumbnail: AssetUpload {
                file_name: "cover.jpg".to_string(),
                bytes: b"thumb-bytes".to_vec(),
            },
        }
    }

    fn update_for(row: u32, slug: &str) -> PostUpdate {
        PostUpdate {
            row_index: row,
            title: format!("Post {slug}"),
            post_url: slug.to_string(),
            url: None,
            labels: "travel".to_string(),
            author: "admin".to_string(),
            video_link: MemoryAssetStore::public_url(&format!("videos/{slug}-clip.mp4")),
            feature_image: MemoryAssetStore::public_url(&format!("thumbnails/{slug}-cover.jpg")),
            new_video: None,
            old_video_path: None,
            new_thumbnail: None,
            old_thumbnail_path: None,
            published: None,
        }
    }

    #[tokio::test]
    async fn test_create_writes_assets_before_record() {
        let h = harness();
        let fields = h.orchestrator.create(new_post("trip")).await.unwrap();

        assert_eq!(
            calls(&h.log),
            vec![
                "asset.put videos/trip-clip.mp4",
                "asset.put thumbnails/trip-cover.jpg",
                "record.create trip",
            ]
        );
        assert_eq!(
            fields.video_link,
            MemoryAssetStore::public_url("videos/trip-clip.mp4")
        );
        assert_eq!(
            fields.feature_image,
            MemoryAssetStore::public_url("thumbnails/trip-cover.jpg")
        );
        assert_eq!(h.records.row(1).unwrap().video_link, fields.video_link);
    }

    #[tokio::test]
    async fn test_create_aborts_before_record_when_asset_write_fails() {
        let h = harness();
        h.assets.set_fail_puts(true);

        let err = h.orchestrator.create(new_post("trip")).await.unwrap_err();
        assert!(matches!(err, Error::AssetWrite { .. }));
        assert!(h.records.is_empty());
        assert!(
            !calls(&h.log).iter().any(|call| call.starts_with("record.")),
            "no record-store call may happen after a failed asset write"
        );
    }

    #[tokio::test]
    async fn test_update_with_new_video_keeps_thumbnail_url() {
        let h = harness();
        h.orchestrator.create(new_post("trip")).await.unwrap();

        let mut update = update_for(1, "trip");
        update.new_video = Some(AssetUpload {
            file_name: "remaster.mp4".to_string(),
            bytes: b"new-video".to_vec(),
        });
        update.old_video_path = Some("videos/trip-clip.mp4".to_string());

        let fields = h.orchestrator.update(update).await.unwrap();

        assert_eq!(
            fields.video_link,
            MemoryAssetStore::public_url("videos/trip-remaster.mp4")
        );
        // The thumbnail slot had no new content: URL passes through.
        assert_eq!(
            fields.feature_image,
            MemoryAssetStore::public_url("thumbnails/trip-cover.jpg")
        );
        assert!(!h.assets.contains("videos/trip-clip.mp4"));
        assert!(h.assets.contains("videos/trip-remaster.mp4"));

        // Old path deleted only after the new upload, record updated last.
        let log = calls(&h.log);
        let tail = &log[log.len() - 3..];
        assert_eq!(
            tail,
            [
                "asset.put videos/trip-remaster.mp4",
                "asset.delete videos/trip-clip.mp4",
                "record.update 1",
            ]
        );
    }

    #[tokio::test]
    async fn test_update_upload_failure_leaves_old_asset_untouched() {
        let h = harness();
        h.orchestrator.create(new_post("trip")).await.unwrap();
        h.assets.set_fail_puts(true);

        let mut update = update_for(1, "trip");
        update.new_video = Some(AssetUpload {
            file_name: "remaster.mp4".to_string(),
            bytes: b"new-video".to_vec(),
        });
        update.old_video_path = Some("videos/trip-clip.mp4".to_string());

        assert!(h.orchestrator.update(update).await.is_err());
        assert!(h.assets.contains("videos/trip-clip.mp4"));
        assert!(
            !calls(&h.log).iter().any(|call| call.starts_with("asset.delete")),
            "old asset must not be deleted when the upload failed"
        );
    }

    #[tokio::test]
    async fn test_update_same_path_is_not_deleted_after_overwrite() {
        let h = harness();
        h.orchestrator.create(new_post("trip")).await.unwrap();

        let mut update = update_for(1, "trip");
        update.new_video = Some(AssetUpload {
            file_name: "clip.mp4".to_string(),
            bytes: b"recut".to_vec(),
        });
        update.old_video_path = Some("videos/trip-clip.mp4".to_string());

        h.orchestrator.update(update).await.unwrap();
        assert_eq!(h.assets.object("videos/trip-clip.mp4").unwrap(), b"recut");
        assert!(
            !calls(&h.log).iter().any(|call| call.starts_with("asset.delete")),
            "overwrite in place must not delete the fresh upload"
        );
    }

    #[tokio::test]
    async fn test_update_slug_change_rebuilds_paths() {
        let h = harness();
        h.orchestrator.create(new_post("old-slug")).await.unwrap();

        let mut update = update_for(1, "new-slug");
        update.new_video = Some(AssetUpload {
            file_name: "clip.mp4".to_string(),
            bytes: b"video-bytes".to_vec(),
        });
        update.old_video_path = Some("videos/old-slug-clip.mp4".to_string());

        let fields = h.orchestrator.update(update).await.unwrap();
        assert_eq!(
            fields.video_link,
            MemoryAssetStore::public_url("videos/new-slug-clip.mp4")
        );
        assert!(!h.assets.contains("videos/old-slug-clip.mp4"));
    }

    #[tokio::test]
    async fn test_update_keeps_stored_published() {
        let h = harness();
        h.orchestrator.create(new_post("trip")).await.unwrap();
        let original = h.records.row(1).unwrap().published;

        let mut update = update_for(1, "trip");
        update.title = "Post trip (edited)".to_string();
        h.orchestrator.update(update).await.unwrap();

        let row = h.records.row(1).unwrap();
        assert_eq!(row.title, "Post trip (edited)");
        assert_eq!(row.published, original);
    }

    #[tokio::test]
    async fn test_update_writes_supplied_published() {
        let h = harness();
        h.orchestrator.create(new_post("trip")).await.unwrap();

        let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut update = update_for(1, "trip");
        update.published = Some(stamp);
        h.orchestrator.update(update).await.unwrap();

        assert_eq!(h.records.row(1).unwrap().published, stamp.to_rfc3339());
    }

    #[tokio::test]
    async fn test_delete_still_deletes_record_when_asset_deletes_fail() {
        let h = harness();
        h.orchestrator.create(new_post("trip")).await.unwrap();
        h.assets.set_fail_deletes(true);

        h.orchestrator
            .delete(PostDelete {
                row_index: 1,
                video_path: Some("videos/trip-clip.mp4".to_string()),
                thumbnail_path: Some("thumbnails/trip-cover.jpg".to_string()),
            })
            .await
            .unwrap();

        assert!(h.records.is_empty());
        let record_deletes = calls(&h.log)
            .iter()
            .filter(|call| call.as_str() == "record.delete 1")
            .count();
        assert_eq!(record_deletes, 1);
    }

    #[tokio::test]
    async fn test_delete_without_paths_only_touches_record() {
        let h = harness();
        h.orchestrator.create(new_post("trip")).await.unwrap();

        h.orchestrator
            .delete(PostDelete {
                row_index: 1,
                video_path: None,
                thumbnail_path: None,
            })
            .await
            .unwrap();

        assert!(h.records.is_empty());
        assert!(
            !calls(&h.log).iter().any(|call| call.starts_with("asset.delete")),
        );
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_slug() {
        let h = harness();
        let mut post = new_post("trip");
        post.post_url = "a/b".to_string();
        assert!(matches!(
            h.orchestrator.create(post).await,
            Err(Error::Validation(_))
        ));
        assert!(calls(&h.log).is_empty());
    }
}
