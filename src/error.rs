//! Error types shared across the backend.
//!
//! Store clients return their own small error enums; everything converges
//! into [`Error`] at the workflow and HTTP boundary, which carries the
//! status-code mapping for responses.

use crate::auth::AuthError;
use crate::stores::{AssetError, RecordError};

/// Result type for workflow and handler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Backend errors with structured context.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, malformed, or expired session; or bad credentials.
    ///
    /// Deliberately carries no detail: callers must not be able to
    /// distinguish a forged token from an expired one.
    #[error("unauthorized")]
    Unauthorized,

    /// Request origin is not allow-listed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A mutating request is missing required fields or carries
    /// undecodable content.
    #[error("{0}")]
    Validation(String),

    /// The remote asset store rejected a write (e.g. size limit).
    #[error("asset write failed for '{path}': {reason}")]
    AssetWrite { path: String, reason: String },

    /// A record-store call failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Asset or record absent where the operation assumes presence.
    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden(_) => 403,
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::AssetWrite { .. } | Self::Upstream(_) => 500,
        }
    }
}

impl From<AuthError> for Error {
    fn from(_: AuthError) -> Self {
        // Collapse the finer-grained kinds; see `Error::Unauthorized`.
        Self::Unauthorized
    }
}

impl From<AssetError> for Error {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::WriteFailed { path, reason } => Self::AssetWrite { path, reason },
            AssetError::NotFound { path } => Self::NotFound(path),
            AssetError::Transport(reason) => Self::Upstream(reason),
        }
    }
}

impl From<RecordError> for Error {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Rejected { status, message } => {
                Self::Upstream(format!("record store returned {status}: {message}"))
            },
            RecordError::Transport(reason) => Self::Upstream(reason),
        }
    }
}
