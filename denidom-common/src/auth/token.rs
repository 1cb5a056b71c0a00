//! Bearer tokens
//!
//! HS256 JWT in compact form: `base64url(header).base64url(claims).base64url(sig)`,
//! all segments unpadded. Only `{"alg":"HS256","typ":"JWT"}` headers are
//! accepted; `exp` is checked against the current Unix time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Claims valid for `ttl_hours` starting at `now`
    pub fn new(user_id: &str, email: &str, role: &str, now: i64, ttl_hours: i64) -> Self {
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + ttl_hours * 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not three dot-separated segments, or a segment is not base64url
    Malformed,

    /// Header names an algorithm other than HS256
    UnsupportedAlgorithm(String),

    /// Signature does not match the payload
    InvalidSignature,

    /// `exp` is in the past
    Expired { exp: i64, now: i64 },

    /// Signing key rejected by HMAC
    Key(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "Malformed token"),
            TokenError::UnsupportedAlgorithm(alg) => write!(f, "Unsupported algorithm: {}", alg),
            TokenError::InvalidSignature => write!(f, "Invalid token signature"),
            TokenError::Expired { exp, now } => {
                write!(f, "Token expired at {} (now {})", exp, now)
            }
            TokenError::Key(err) => write!(f, "Signing key error: {}", err),
        }
    }
}

impl std::error::Error for TokenError {}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Sign claims into a compact token
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = URL_SAFE_NO_PAD.encode(HEADER_JSON);
    // Serializing a struct of strings and integers cannot fail
    let payload_json = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
    let payload = URL_SAFE_NO_PAD.encode(payload_json);

    let signing_input = format!("{}.{}", header, payload);
    let signature = sign(signing_input.as_bytes(), secret)?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify signature and expiry against `now` (Unix seconds)
pub fn verify_token_at(token: &str, secret: &str, now: i64) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let (header, payload, signature) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(h), Some(p), Some(s), None) => (h, p, s),
        _ => return Err(TokenError::Malformed),
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let parsed: Header = serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
    if parsed.alg != "HS256" {
        return Err(TokenError::UnsupportedAlgorithm(parsed.alg));
    }

    let signature_bytes = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Malformed)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| TokenError::Key(e.to_string()))?;
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature_bytes)
        .map_err(|_| TokenError::InvalidSignature)?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Malformed)?;
    let claims: Claims =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

    if claims.exp <= now {
        return Err(TokenError::Expired {
            exp: claims.exp,
            now,
        });
    }

    Ok(claims)
}

/// Verify a token against the current time
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    verify_token_at(token, secret, crate::time::unix_seconds())
}

fn sign(input: &[u8], secret: &str) -> Result<Vec<u8>, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| TokenError::Key(e.to_string()))?;
    mac.update(input);
    Ok(mac.finalize().into_bytes().to_vec())
}
