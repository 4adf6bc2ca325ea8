//! Access-token expiry inspection. Tokens are JWTs whose signature is the
//! backend's business; the client only reads the `exp` claim to decide
//! whether a refresh is due.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub exp: i64,
    #[serde(default)]
    pub sub: Option<String>,
}

/// Decodes the payload segment of a JWT without verifying it.
///
/// # Errors
/// Returns an error if the token is not three dot-separated segments, or the payload is not base64url JSON with an `exp`.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::TokenFormat);
    };

    // tolerate padded encoders
    let payload = payload.trim_end_matches('=');
    let bytes = Base64UrlUnpadded::decode_vec(payload).map_err(|_| TokenError::Base64)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Json)
}

/// Seconds since the Unix epoch.
#[must_use]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

/// A token is expired once `exp <= now`. Undecodable tokens count as expired.
#[must_use]
pub fn is_token_expired(token: &str, now: i64) -> bool {
    decode_claims(token).map_or(true, |claims| claims.exp <= now)
}
