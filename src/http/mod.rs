//! HTTP surface: state, routing, CORS, and response envelopes.

pub mod audit;
pub mod handlers;

use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::error;
use url::Url;

use crate::auth::SessionGate;
use crate::error::Error;
use crate::posts::PostOrchestrator;
use crate::stores::{AssetStore, RecordStore};

/// Request timeout for the whole surface.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<SessionGate>,
    pub posts: Arc<PostOrchestrator>,
    pub assets: Arc<dyn AssetStore>,
    pub records: Arc<dyn RecordStore>,
    pub origins: Arc<OriginPolicy>,
}

/// Origin allow-listing by hostname.
///
/// The admin surface tolerates a missing Origin header (non-browser
/// clients); the public surface requires one.
pub struct OriginPolicy {
    admin_host: String,
    public_host: String,
}

impl OriginPolicy {
    pub fn new(admin_host: impl Into<String>, public_host: impl Into<String>) -> Self {
        Self {
            admin_host: admin_host.into(),
            public_host: public_host.into(),
        }
    }

    /// True if `origin`'s host is one of the allowed hostnames.
    pub fn is_allowed(&self, origin: &str) -> bool {
        match host_of(origin) {
            Some(host) => host == self.admin_host || host == self.public_host,
            None => false,
        }
    }

    /// Gate for the admin surface: an Origin header, when present, must
    /// name the admin host.
    pub fn check_admin(&self, headers: &axum::http::HeaderMap) -> Result<(), Error> {
        match origin_header(headers) {
            None => Ok(()),
            Some(origin) if host_of(origin).as_deref() == Some(&self.admin_host) => Ok(()),
            Some(origin) => Err(Error::Forbidden(format!("origin not allowed: {origin}"))),
        }
    }

    /// Gate for the public surface: an Origin header is required and must
    /// name the public host.
    pub fn check_public(&self, headers: &axum::http::HeaderMap) -> Result<(), Error> {
        let origin =
            origin_header(headers).ok_or_else(|| Error::Forbidden("missing origin".to_string()))?;
        if host_of(origin).as_deref() == Some(&self.public_host) {
            Ok(())
        } else {
            Err(Error::Forbidden(format!("origin not allowed: {origin}")))
        }
    }
}

fn origin_header(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers.get(header::ORIGIN).and_then(|value| value.to_str().ok())
}

fn host_of(origin: &str) -> Option<String> {
    Url::parse(origin)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

/// Handler error: wraps [`Error`] and renders the JSON error envelope.
pub struct AppError(Error);

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        // 401 responses stay opaque; everything else carries the message.
        let message = match &self.0 {
            Error::Unauthorized => "Unauthorized".to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            error!(%status, error = %self.0, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Body of every successful mutating response.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

/// The `{"success": true}` envelope.
pub fn success() -> Json<Success> {
    Json(Success { success: true })
}

/// Build the bare router (no middleware); used directly by tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
        .route(
            "/api/admin/posts",
            get(handlers::posts::list_posts)
                .post(handlers::posts::create_post)
                .put(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route(
            "/api/files",
            get(handlers::files::list_files)
                .post(handlers::files::upload_file)
                .put(handlers::files::rename_file)
                .delete(handlers::files::delete_files),
        )
        .route(
            "/api/public",
            get(handlers::public::read).post(handlers::public::count_view),
        )
        .with_state(state)
}

/// Build the full application: router plus CORS and timeout layers.
pub fn app(state: AppState) -> Router {
    let origins = state.origins.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .is_ok_and(|origin| origins.is_allowed(origin))
        }))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    router(state)
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    fn policy() -> OriginPolicy {
        OriginPolicy::new("admin.example.com", "blog.example.com")
    }

    fn headers_with_origin(origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, origin.parse().unwrap());
        headers
    }

    #[test]
    fn test_admin_check_allows_missing_origin() {
        assert!(policy().check_admin(&HeaderMap::new()).is_ok());
    }

    #[test]
    fn test_admin_check_rejects_foreign_origin() {
        let headers = headers_with_origin("https://evil.example.net");
        assert!(matches!(
            policy().check_admin(&headers),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn test_public_check_requires_origin() {
        assert!(matches!(
            policy().check_public(&HeaderMap::new()),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn test_public_check_accepts_public_host() {
        let headers = headers_with_origin("https://blog.example.com");
        assert!(policy().check_public(&headers).is_ok());
    }

    #[test]
    fn test_public_check_rejects_malformed_origin() {
        let headers = headers_with_origin("not-a-url");
        assert!(policy().check_public(&headers).is_err());
    }

    #[test]
    fn test_cors_predicate_covers_both_hosts() {
        let policy = policy();
        assert!(policy.is_allowed("https://admin.example.com"));
        assert!(policy.is_allowed("https://blog.example.com"));
        assert!(!policy.is_allowed("https://other.example.com"));
    }
}
