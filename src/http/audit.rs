//! Security audit logging for authentication events.

use tracing::{info, warn};

/// Security audit events that should be logged for monitoring and alerting.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// Failed login attempt.
    LoginFailure { username: String },
    /// Successful login.
    LoginSuccess { user: String },
    /// Request rejected by the session gate.
    SessionRejected { reason: String },
}

/// Log a security audit event with structured fields.
pub fn log_audit_event(event: AuditEvent) {
    match event {
        AuditEvent::LoginFailure { username } => {
            warn!(
                target: "audit",
                event_type = "login_failure",
                %username,
                "Login failed"
            );
        },
        AuditEvent::LoginSuccess { user } => {
            info!(
                target: "audit",
                event_type = "login_success",
                %user,
                "Login succeeded"
            );
        },
        AuditEvent::SessionRejected { reason } => {
            warn!(
                target: "audit",
                event_type = "session_rejected",
                %reason,
                "Session rejected"
            );
        },
    }
}
