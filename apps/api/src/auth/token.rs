//! Signed-token issuance and verification for session identity.
//!
//! Tokens are HS256 JWTs carrying the subject id and role. Verification
//! failures (bad signature, expiry, malformed token) all collapse into
//! `None` so callers cannot distinguish which check failed.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::UserType;

/// Default session lifetime in hours.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Default session lifetime.
pub fn token_ttl() -> Duration {
    Duration::hours(TOKEN_TTL_HOURS)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, stringified.
    pub sub: String,
    pub user_type: String,
    /// Expiry as unix seconds.
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Produces a signed, time-limited token for the given user.
pub fn issue_token(
    secret: &str,
    user_id: i32,
    user_type: UserType,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        user_type: user_type.as_str().to_string(),
        exp: (Utc::now() + ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates signature and expiry, returning the claims on success.
pub fn verify_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Extracts and verifies the `Authorization: Bearer` token from request
/// headers. Protected handlers call this and propagate the error.
pub fn bearer_claims(headers: &HeaderMap, secret: &str) -> Result<Claims, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;
    let token = value.strip_prefix("Bearer ").ok_or(AppError::Unauthenticated)?;
    verify_token(secret, token).ok_or(AppError::Unauthenticated)
}
