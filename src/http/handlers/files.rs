//! File-explorer surface: direct asset operations, session-gated.
//!
//! These endpoints work on the asset store alone and never touch the
//! record store.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use serde::Deserialize;

use super::super::{AppError, AppState, Success, success};
use super::{decode_base64, require_non_empty, require_session};
use crate::stores::AssetEntry;

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadRequest {
    path: String,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenameRequest {
    old_path: String,
    new_path: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkDeleteRequest {
    paths: Vec<String>,
}

/// GET /api/files?path= - list a folder.
pub(crate) async fn list_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AssetEntry>>, AppError> {
    require_session(&state, &headers)?;
    let entries = state.assets.list(&query.path).await?;
    Ok(Json(entries))
}

/// POST /api/files - upload a file to an explicit path.
pub(crate) async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UploadRequest>,
) -> Result<Json<Success>, AppError> {
    require_session(&state, &headers)?;
    require_non_empty("path", &request.path)?;
    require_non_empty("content", &request.content)?;

    let bytes = decode_base64("content", &request.content)?;
    state.assets.put(&request.path, &bytes).await?;
    Ok(success())
}

/// PUT /api/files - move a file to a new path.
pub(crate) async fn rename_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RenameRequest>,
) -> Result<Json<Success>, AppError> {
    require_session(&state, &headers)?;
    require_non_empty("oldPath", &request.old_path)?;
    require_non_empty("newPath", &request.new_path)?;

    state
        .assets
        .rename(&request.old_path, &request.new_path)
        .await?;
    Ok(success())
}

/// DELETE /api/files - delete a list of paths; missing files are skipped.
pub(crate) async fn delete_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<Success>, AppError> {
    require_session(&state, &headers)?;

    for path in &request.paths {
        state.assets.delete(path).await?;
    }
    Ok(success())
}
