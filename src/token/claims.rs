//! Claims decoding for compact session tokens.
//!
//! Tokens are treated as opaque strings with a base64url-encoded JSON
//! claims payload in the second dot-separated segment. Anything malformed
//! decodes to nothing: the caller fails open and relies on the eventual
//! unauthorized response elsewhere to force re-authentication.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

/// Decoded claims payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiration timestamp, seconds since epoch.
    #[serde(default)]
    pub exp: Option<u64>,
    /// Subject the token was issued to.
    #[serde(default)]
    pub sub: Option<String>,
}

/// Decode the claims payload of a compact token.
///
/// Returns `None` for any malformed input: missing payload segment,
/// invalid base64url, or an undecodable JSON body.
pub fn parse_claims(token: &str) -> Option<Claims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Whether a token's expiration lies in the past.
///
/// Tokens without a decodable expiration claim count as expired here;
/// callers that must fail open use [`parse_claims`] directly.
pub fn is_expired(token: &str, now_secs: u64) -> bool {
    match parse_claims(token).and_then(|claims| claims.exp) {
        Some(exp) => exp < now_secs,
        None => true,
    }
}

#[cfg(test)]
pub(crate) fn make_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}
