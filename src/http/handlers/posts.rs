//! Admin post CRUD, gated by the session cookie.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{AppError, AppState, Success, success};
use super::{decode_base64, require_non_empty, require_session};
use crate::posts::{AssetUpload, NewPost, PostDelete, PostUpdate};
use crate::stores::PostRecord;

#[derive(Debug, Serialize)]
pub(crate) struct PostListResponse {
    posts: Vec<PostRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePostRequest {
    title: String,
    post_url: String,
    #[serde(default)]
    url: Option<String>,
    labels: String,
    author: String,
    video_base64: String,
    thumbnail_base64: String,
    original_video_name: String,
    original_thumb_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePostRequest {
    row_index: u32,
    title: String,
    post_url: String,
    #[serde(default)]
    url: Option<String>,
    labels: String,
    author: String,
    video_link: String,
    feature_image: String,
    #[serde(default)]
    video_base64: Option<String>,
    #[serde(default)]
    original_video_name: Option<String>,
    #[serde(default)]
    old_video_path: Option<String>,
    #[serde(default)]
    thumbnail_base64: Option<String>,
    #[serde(default)]
    original_thumb_name: Option<String>,
    #[serde(default)]
    old_thumb_path: Option<String>,
    /// Optional explicit publication time; omitted means keep the
    /// stored one.
    #[serde(default)]
    published: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeletePostRequest {
    #[serde(rename = "rowIndex")]
    row_index: u32,
    #[serde(rename = "vPath", default)]
    video_path: Option<String>,
    #[serde(rename = "tPath", default)]
    thumbnail_path: Option<String>,
}

/// GET /api/admin/posts - full record list.
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PostListResponse>, AppError> {
    require_session(&state, &headers)?;
    let posts = state.posts.list().await?;
    Ok(Json(PostListResponse { posts }))
}

/// POST /api/admin/posts - create a post with both assets.
pub(crate) async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<Success>, AppError> {
    require_session(&state, &headers)?;

    require_non_empty("title", &request.title)?;
    require_non_empty("postUrl", &request.post_url)?;
    require_non_empty("videoBase64", &request.video_base64)?;
    require_non_empty("thumbnailBase64", &request.thumbnail_base64)?;
    require_non_empty("originalVideoName", &request.original_video_name)?;
    require_non_empty("originalThumbName", &request.original_thumb_name)?;

    let post = NewPost {
        title: request.title,
        post_url: request.post_url,
        url: request.url,
        labels: request.labels,
        author: request.author,
        video: AssetUpload {
            file_name: request.original_video_name,
            bytes: decode_base64("videoBase64", &request.video_base64)?,
        },
        thumbnail: AssetUpload {
            file_name: request.original_thumb_name,
            bytes: decode_base64("thumbnailBase64", &request.thumbnail_base64)?,
        },
    };

    state.posts.create(post).await?;
    Ok(success())
}

/// PUT /api/admin/posts - update a post, optionally replacing assets.
pub(crate) async fn update_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<Success>, AppError> {
    require_session(&state, &headers)?;

    require_non_empty("title", &request.title)?;
    require_non_empty("postUrl", &request.post_url)?;

    let new_video = pending_upload(
        "videoBase64",
        "originalVideoName",
        request.video_base64.as_deref(),
        request.original_video_name,
    )?;
    let new_thumbnail = pending_upload(
        "thumbnailBase64",
        "originalThumbName",
        request.thumbnail_base64.as_deref(),
        request.original_thumb_name,
    )?;

    let update = PostUpdate {
        row_index: request.row_index,
        title: request.title,
        post_url: request.post_url,
        url: request.url,
        labels: request.labels,
        author: request.author,
        video_link: request.video_link,
        feature_image: request.feature_image,
        new_video,
        old_video_path: request.old_video_path,
        new_thumbnail,
        old_thumbnail_path: request.old_thumb_path,
        published: request.published,
    };

    state.posts.update(update).await?;
    Ok(success())
}

/// DELETE /api/admin/posts - delete a post and retire its assets.
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<DeletePostRequest>,
) -> Result<Json<Success>, AppError> {
    require_session(&state, &headers)?;

    state
        .posts
        .delete(PostDelete {
            row_index: request.row_index,
            video_path: request.video_path,
            thumbnail_path: request.thumbnail_path,
        })
        .await?;
    Ok(success())
}

/// Pair an optional base64 payload with its required file name.
fn pending_upload(
    content_field: &str,
    name_field: &str,
    content: Option<&str>,
    file_name: Option<String>,
) -> Result<Option<AssetUpload>, AppError> {
    match content {
        None => Ok(None),
        Some(content) => {
            let file_name = file_name.ok_or_else(|| {
                AppError::from(crate::error::Error::validation(format!(
                    "{name_field} is required when {content_field} is supplied"
                )))
            })?;
            Ok(Some(AssetUpload {
                file_name,
                bytes: decode_base64(content_field, content)?,
            }))
        },
    }
}
