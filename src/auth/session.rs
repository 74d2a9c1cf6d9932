//! Session gate: cookie extraction, credential check, token lifecycle.
//!
//! The gate is the sole authorization boundary. It owns the token codec
//! and the configured administrator credentials, and renders the cookie
//! directives the HTTP layer attaches to responses.

use chrono::{Duration, Utc};

use super::token::{Claims, TokenCodec, TokenError};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Fixed session lifetime: 4 hours.
pub const SESSION_DURATION_SECS: i64 = 4 * 60 * 60;

/// Authentication failures.
///
/// The HTTP layer collapses every variant into a single 401 so responses
/// cannot be used as an oracle for why a session was rejected.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Request carried no cookie header.
    #[error("no session cookie")]
    NoCookie,

    /// Cookie header present but no `session=` pair.
    #[error("no session token")]
    NoToken,

    /// Username or password did not match the configured values.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token failed verification.
    #[error("invalid session token")]
    InvalidToken(#[source] TokenError),
}

/// Authenticates requests and issues session tokens.
#[derive(Clone)]
pub struct SessionGate {
    codec: TokenCodec,
    admin_username: String,
    admin_password: String,
}

impl SessionGate {
    pub fn new(
        codec: TokenCodec,
        admin_username: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            codec,
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
        }
    }

    /// Authenticate a request from its cookie header.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoCookie`] when the header is absent,
    /// [`AuthError::NoToken`] when it carries no `session=` pair, and
    /// [`AuthError::InvalidToken`] for any codec failure.
    pub fn authenticate(&self, cookie_header: Option<&str>) -> Result<Claims, AuthError> {
        let header = cookie_header.ok_or(AuthError::NoCookie)?;
        let token = extract_session_token(header).ok_or(AuthError::NoToken)?;
        self.codec.verify(token).map_err(AuthError::InvalidToken)
    }

    /// Check credentials and issue a fresh session token.
    ///
    /// Comparison is verbatim string equality against the configured
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when either field does
    /// not match.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if username != self.admin_username || password != self.admin_password {
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims {
            user: username.to_string(),
            exp: (Utc::now() + Duration::seconds(SESSION_DURATION_SECS)).timestamp_millis(),
        };
        Ok(self.codec.sign(&claims))
    }

    /// Render the Set-Cookie value for a freshly issued token.
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{SESSION_COOKIE}={token}; HttpOnly; Secure; SameSite=None; Path=/; Max-Age={SESSION_DURATION_SECS}"
        )
    }

    /// Render the Set-Cookie value that clears the session.
    ///
    /// There is no server-side state to discard; expiring the cookie is
    /// the whole logout.
    pub fn logout_cookie(&self) -> String {
        format!("{SESSION_COOKIE}=; HttpOnly; Secure; SameSite=None; Path=/; Max-Age=0")
    }
}

/// Pull the session token out of a cookie header.
fn extract_session_token(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .filter(|token| !token.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> SessionGate {
        SessionGate::new(TokenCodec::new("test-secret"), "admin", "correct")
    }

    #[test]
    fn test_login_with_correct_credentials() {
        let token = gate().login("admin", "correct").unwrap();
        let claims = TokenCodec::new("test-secret").verify(&token).unwrap();
        assert_eq!(claims.user, "admin");
        assert!(claims.is_fresh());
    }

    #[test]
    fn test_login_with_wrong_password() {
        assert!(matches!(
            gate().login("admin", "wrong-password"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_login_with_wrong_username() {
        assert!(matches!(
            gate().login("intruder", "correct"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_round_trip() {
        let gate = gate();
        let token = gate.login("admin", "correct").unwrap();
        let header = format!("theme=dark; session={token}; lang=en");
        let claims = gate.authenticate(Some(&header)).unwrap();
        assert_eq!(claims.user, "admin");
    }

    #[test]
    fn test_authenticate_without_cookie_header() {
        assert!(matches!(gate().authenticate(None), Err(AuthError::NoCookie)));
    }

    #[test]
    fn test_authenticate_without_session_pair() {
        assert!(matches!(
            gate().authenticate(Some("theme=dark; lang=en")),
            Err(AuthError::NoToken)
        ));
    }

    #[test]
    fn test_authenticate_with_forged_token() {
        assert!(matches!(
            gate().authenticate(Some("session=abc.def")),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_authenticate_with_expired_token() {
        let codec = TokenCodec::new("test-secret");
        let stale = codec.sign(&Claims {
            user: "admin".to_string(),
            exp: Utc::now().timestamp_millis() - 1,
        });
        assert!(matches!(
            gate().authenticate(Some(&format!("session={stale}"))),
            Err(AuthError::InvalidToken(TokenError::Expired))
        ));
    }

    #[test]
    fn test_cookie_attributes() {
        let gate = gate();
        let cookie = gate.session_cookie("tok");
        assert!(cookie.starts_with("session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=14400"));

        let cleared = gate.logout_cookie();
        assert!(cleared.starts_with("session=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[test]
    fn test_session_cookie_name_is_not_a_prefix_match() {
        // `session_id=` must not satisfy the `session=` lookup.
        assert!(matches!(
            gate().authenticate(Some("session_id=abc")),
            Err(AuthError::NoToken)
        ));
    }
}
