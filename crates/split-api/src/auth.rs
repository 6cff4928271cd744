//! # Caller Authentication
//!
//! Callers present `Authorization: Bearer <ID token>`. A missing or invalid
//! token is not an error at this layer: the request simply has no caller,
//! and operations that need one reject it themselves.

use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use split_core::CallerIdentity;
use std::convert::Infallible;
use tracing::debug;

/// Verifies caller ID tokens
pub trait CallerVerifier: Send + Sync {
    /// The caller the token identifies, or `None` if it does not verify
    fn verify(&self, token: &str) -> Option<CallerIdentity>;
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// HS256 ID token verifier
pub struct JwtCallerVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtCallerVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Builder: require the `iss` claim
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Builder: require the `aud` claim
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }
}

impl CallerVerifier for JwtCallerVerifier {
    fn verify(&self, token: &str) -> Option<CallerIdentity> {
        match decode::<IdTokenClaims>(token, &self.key, &self.validation) {
            Ok(data) if !data.claims.sub.is_empty() => Some(CallerIdentity {
                uid: data.claims.sub,
                email: data.claims.email,
            }),
            Ok(_) => {
                debug!("ID token has an empty subject");
                None
            }
            Err(e) => {
                debug!("ID token rejected: {}", e);
                None
            }
        }
    }
}

/// Bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The verified caller of a request, if any
pub struct Caller(pub Option<CallerIdentity>);

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = bearer_token(&parts.headers).and_then(|token| state.verifier.verify(token));
        Ok(Caller(caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        email: &'a str,
        exp: u64,
        iss: &'a str,
    }

    fn token(secret: &[u8], sub: &str, exp: u64) -> String {
        let claims = Claims {
            sub,
            email: "ada@example.com",
            exp,
            iss: "split-pay-test",
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = JwtCallerVerifier::new(b"secret");
        let caller = verifier
            .verify(&token(b"secret", "uid-1", get_current_timestamp() + 3600))
            .unwrap();

        assert_eq!(caller.uid, "uid-1");
        assert_eq!(caller.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_verify_rejects_bad_tokens() {
        let verifier = JwtCallerVerifier::new(b"secret");
        let later = get_current_timestamp() + 3600;

        assert!(verifier.verify(&token(b"other", "uid-1", later)).is_none());
        assert!(verifier.verify(&token(b"secret", "uid-1", 1_000)).is_none());
        assert!(verifier.verify(&token(b"secret", "", later)).is_none());
        assert!(verifier.verify("not-a-jwt").is_none());
    }

    #[test]
    fn test_issuer_is_checked() {
        let later = get_current_timestamp() + 3600;

        let verifier = JwtCallerVerifier::new(b"secret").with_issuer("split-pay-test");
        assert!(verifier.verify(&token(b"secret", "uid-1", later)).is_some());

        let verifier = JwtCallerVerifier::new(b"secret").with_issuer("someone-else");
        assert!(verifier.verify(&token(b"secret", "uid-1", later)).is_none());
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);
    }
}
