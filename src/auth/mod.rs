//! Authentication: stateless HMAC session tokens and the session gate.

pub mod session;
pub mod token;

pub use session::{AuthError, SESSION_COOKIE, SESSION_DURATION_SECS, SessionGate};
pub use token::{Claims, TokenCodec, TokenError};
