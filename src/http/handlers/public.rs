//! Public read API, gated by origin instead of session.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::super::{AppError, AppState};
use crate::error::Error;
use crate::posts::queries;
use crate::stores::PostRecord;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 12;

#[derive(Debug, Deserialize)]
pub(crate) struct PublicQuery {
    #[serde(default)]
    action: Option<String>,
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    query: String,
    #[serde(default)]
    slug: String,
}

fn default_page() -> usize {
    DEFAULT_PAGE
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse {
    success: bool,
    page: usize,
    total_pages: usize,
    total_posts: usize,
    posts: Vec<PostRecord>,
}

impl From<queries::Page> for PageResponse {
    fn from(page: queries::Page) -> Self {
        Self {
            success: true,
            page: page.page,
            total_pages: page.total_pages,
            total_posts: page.total_posts,
            posts: page.posts,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SinglePostResponse {
    success: bool,
    post: PostRecord,
    related_posts: Vec<PostRecord>,
}

#[derive(Debug, Serialize)]
struct PopularResponse {
    success: bool,
    posts: Vec<PostRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewRequest {
    #[serde(default)]
    slug: String,
}

/// GET /api/public?action= - listing, search, single post, popular.
pub(crate) async fn read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PublicQuery>,
) -> Result<Response, AppError> {
    state.origins.check_public(&headers)?;

    let limit = query.limit.max(1);
    let mut posts = state.records.list().await?;
    queries::sort_canonical(&mut posts);

    match query.action.as_deref() {
        Some("get_posts") => {
            let page = queries::paginate(&posts, query.page, limit);
            Ok(Json(PageResponse::from(page)).into_response())
        },
        Some("search") => {
            let hits = queries::search(&posts, &query.query);
            let page = queries::paginate(&hits, query.page, limit);
            Ok(Json(PageResponse::from(page)).into_response())
        },
        Some("get_post") => {
            let (post, related_posts) = queries::find_with_related(&posts, &query.slug)
                .ok_or_else(|| Error::NotFound("Post not found".to_string()))?;
            Ok(Json(SinglePostResponse {
                success: true,
                post,
                related_posts,
            })
            .into_response())
        },
        Some("get_popular") => Ok(Json(PopularResponse {
            success: true,
            posts: queries::popular(&posts),
        })
        .into_response()),
        _ => Err(AppError::from(Error::validation(
            "Invalid API action specified.",
        ))),
    }
}

/// POST /api/public?action=view - fire-and-forget view increment.
///
/// The increment is dispatched without waiting for completion; its
/// outcome is not observed and never retried. Lost increments are an
/// accepted trade-off for response latency.
pub(crate) async fn count_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PublicQuery>,
    Json(request): Json<ViewRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.origins.check_public(&headers)?;

    if query.action.as_deref() != Some("view") {
        return Err(AppError::from(Error::validation(
            "Invalid API action specified.",
        )));
    }
    if request.slug.trim().is_empty() {
        return Err(AppError::from(Error::validation("Missing slug")));
    }

    let records = state.records.clone();
    let slug = request.slug;
    tokio::spawn(async move {
        if let Err(err) = records.increment_views(&slug).await {
            warn!(%slug, %err, "View increment failed");
        }
    });

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "View counted",
    })))
}
