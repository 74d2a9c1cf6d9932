//! Stateless session tokens.
//!
//! A token is `base64(claims JSON) + "." + hex(HMAC-SHA256)`. The claims
//! carry the identity and expiry, so no session state is kept server-side:
//! the signature prevents tampering with either field, and the expiry is
//! inside the signed payload so it cannot be stripped without invalidating
//! the signature.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Separator between the claims block and the signature block.
const SEPARATOR: char = '.';

/// Signed payload inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated identity.
    pub user: String,
    /// Expiry as milliseconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// True if the expiry is strictly in the future.
    pub fn is_fresh(&self) -> bool {
        self.exp > Utc::now().timestamp_millis()
    }
}

/// Token verification failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Token does not split into exactly two non-empty parts, or a part
    /// fails to decode.
    #[error("malformed token")]
    Malformed,

    /// Signature does not match a fresh computation over the claims.
    #[error("bad signature")]
    BadSignature,

    /// Signature is valid but the claims have expired.
    #[error("token expired")]
    Expired,
}

/// Signs and verifies session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    /// Create a codec over the given HMAC key.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Serialize and sign claims into a compact token.
    pub fn sign(&self, claims: &Claims) -> String {
        let payload = serde_json::to_string(claims).expect("claims serialization is infallible");
        let signature = self.mac_hex(payload.as_bytes());
        format!("{}{SEPARATOR}{signature}", BASE64.encode(&payload))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] for any token that does not have
    /// the expected two-part shape, [`TokenError::BadSignature`] when the
    /// MAC does not match, and [`TokenError::Expired`] when the signature
    /// is valid but `exp` is not in the future.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut parts = token.split(SEPARATOR);
        let (payload_b64, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(payload), Some(signature), None) if !payload.is_empty() && !signature.is_empty() => {
                (payload, signature)
            },
            _ => return Err(TokenError::Malformed),
        };

        let payload = BASE64.decode(payload_b64).map_err(|_| TokenError::Malformed)?;

        let expected = self.mac_hex(&payload);
        if expected.as_bytes().ct_eq(signature.as_bytes()).unwrap_u8() != 1 {
            return Err(TokenError::BadSignature);
        }

        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        if !claims.is_fresh() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn mac_hex(&self, data: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        hex::encode(mac.finalize().into_bytes())
    }
}
