//! Bearer tokens and the ownership check behind every `/api/{username}` route.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 tokens that carry a username.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &str, expires_in: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    pub fn issue(&self, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expires_in).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify(&self, token: &str) -> std::result::Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
    }
}

/// Decides whether a request may act on `username`'s data.
///
/// The router receives an implementation at construction time, so tests can
/// swap in a permissive one without touching global state.
pub trait Authorizer: Send + Sync + 'static {
    fn authorize(&self, bearer: Option<&str>, username: &str) -> Result<()>;
}

pub type SharedAuthorizer = Arc<dyn Authorizer>;

impl Authorizer for TokenService {
    fn authorize(&self, bearer: Option<&str>, username: &str) -> Result<()> {
        let token = bearer.ok_or_else(|| {
            AppError::Unauthorized("Access denied: missing authorisation token.".to_string())
        })?;

        let claims = self.verify(token).map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            AppError::Unauthorized("Access denied: unable to verify token.".to_string())
        })?;

        if claims.username != username {
            return Err(AppError::Unauthorized(format!(
                "Access denied: token does not grant access to {}.",
                username
            )));
        }

        Ok(())
    }
}

/// Accepts every request. Only for tests that exercise handlers in isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _bearer: Option<&str>, _username: &str) -> Result<()> {
        Ok(())
    }
}

/// Token part of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
