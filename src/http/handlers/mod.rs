//! HTTP handlers organized by surface.

pub mod auth;
pub mod files;
pub mod posts;
pub mod public;

use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::audit::{AuditEvent, log_audit_event};
use super::{AppError, AppState};
use crate::auth::Claims;
use crate::error::Error;

/// Authorize a session-gated request: origin check, then the cookie.
pub(crate) fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Claims, AppError> {
    state.origins.check_admin(headers)?;
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());
    state.gate.authenticate(cookie).map_err(|err| {
        log_audit_event(AuditEvent::SessionRejected {
            reason: err.to_string(),
        });
        AppError::from(err)
    })
}

/// Decode a base64 request field.
pub(crate) fn decode_base64(name: &str, value: &str) -> Result<Vec<u8>, AppError> {
    BASE64
        .decode(value.trim())
        .map_err(|_| AppError::from(Error::validation(format!("{name} is not valid base64"))))
}

/// Reject empty required fields.
pub(crate) fn require_non_empty(name: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::from(Error::validation(format!(
            "Missing required field: {name}"
        ))));
    }
    Ok(())
}
