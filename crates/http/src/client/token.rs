//! Bearer token inspection
//!
//! Tokens are decoded only to read their expiry. The signature is never
//! checked: this decides whether a token is worth sending, and the server
//! remains the only authority on whether it is authentic.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Claims read from a token's payload segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, deserialize_with = "string_or_number")]
    pub sub: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiry in seconds since the Unix epoch
    pub exp: i64,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Why a token could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("expected 3 segments, found {0}")]
    Segments(usize),

    #[error("payload is not base64url: {0}")]
    Base64(String),

    #[error("payload is not valid claims JSON: {0}")]
    Claims(String),
}

/// Result of inspecting a token at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Fresh(Claims),
    Expired(Claims),
    /// Undecodable tokens count as expired
    Invalid(TokenError),
}

impl TokenStatus {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }

    pub fn is_expired(&self) -> bool {
        !self.is_fresh()
    }

    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Self::Fresh(claims) | Self::Expired(claims) => Some(claims),
            Self::Invalid(_) => None,
        }
    }
}

/// Source of the current time in seconds since the Unix epoch
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Decode the payload segment of a `header.payload.signature` token
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Segments(segments.len()));
    }

    // Padding is optional in base64url
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Base64(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))
}

/// Inspect a token against `now`; fresh only while `exp > now`
pub fn inspect_at(token: &str, now: i64) -> TokenStatus {
    match decode_claims(token) {
        Ok(claims) if claims.exp > now => TokenStatus::Fresh(claims),
        Ok(claims) => TokenStatus::Expired(claims),
        Err(e) => TokenStatus::Invalid(e),
    }
}

/// Inspect a token against the wall clock
pub fn inspect(token: &str) -> TokenStatus {
    inspect_at(token, SystemClock.now())
}

/// Whether a token should be treated as expired; never fails open
pub fn is_expired(token: &str) -> bool {
    inspect(token).is_expired()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    #[test]
    fn test_fresh_and_expired_boundaries() {
        let now = 1_700_000_000;
        for (exp, fresh) in [(now + 3600, true), (now + 1, true), (now, false), (now - 1, false)] {
            let token = token_with(&json!({"sub": "7", "iat": now - 60, "exp": exp}));
            assert_eq!(inspect_at(&token, now).is_fresh(), fresh, "exp={exp}");
        }
    }

    #[test]
    fn test_claims_are_read() {
        let token = token_with(&json!({"sub": 42, "iat": 10, "exp": 20}));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.iat, Some(10));
        assert_eq!(claims.exp, 20);
    }

    #[test]
    fn test_padded_payload_accepted() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let body = base64::engine::general_purpose::URL_SAFE.encode(br#"{"exp": 4102444800}"#);
        assert!(body.ends_with('='));
        let token = format!("{header}.{body}.sig");
        assert!(inspect_at(&token, 0).is_fresh());
    }

    #[test]
    fn test_malformed_tokens_are_expired() {
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode(b"not json"));
        let no_exp = token_with(&json!({"sub": "1"}));
        let cases = [
            String::new(),
            "abc".to_string(),
            "a.b".to_string(),
            "a.b.c.d".to_string(),
            "a.!!!.c".to_string(),
            not_json,
            no_exp,
        ];
        for token in cases {
            let status = inspect_at(&token, 0);
            assert!(status.is_expired(), "{token:?}");
            assert!(matches!(status, TokenStatus::Invalid(_)), "{token:?}");
        }
    }

    #[test]
    fn test_segment_count_reported() {
        assert_eq!(decode_claims("a.b"), Err(TokenError::Segments(2)));
    }
}
