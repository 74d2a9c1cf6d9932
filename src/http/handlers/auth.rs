//! Login and logout.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::super::audit::{AuditEvent, log_audit_event};
use super::super::{AppError, AppState, success};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    username: String,
    password: String,
}

/// POST /api/login - check credentials, set the session cookie.
pub(crate) async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.origins.check_admin(&headers)?;

    let token = state
        .gate
        .login(&request.username, &request.password)
        .map_err(|err| {
            log_audit_event(AuditEvent::LoginFailure {
                username: request.username.clone(),
            });
            AppError::from(err)
        })?;

    log_audit_event(AuditEvent::LoginSuccess {
        user: request.username,
    });
    let cookie = state.gate.session_cookie(&token);
    Ok(([(header::SET_COOKIE, cookie)], success()))
}

/// POST /api/logout - expire the session cookie.
///
/// Sessions are stateless, so clearing the cookie is the whole logout.
pub(crate) async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    ([(header::SET_COOKIE, state.gate.logout_cookie())], success())
}
