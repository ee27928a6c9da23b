use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::errors::{AppError, AppResult};
use crate::types::auth::{AuthUser, Claims};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Looks up the user id bound to a live session token.
///
/// Implementations fail closed: any token that is malformed, expired, or has
/// no server-side session resolves to `Ok(None)`.
pub trait SessionResolver {
    fn resolve_session(&self, token: &str) -> AppResult<Option<i32>>;
}

impl<T: SessionResolver> SessionResolver for Arc<T> {
    fn resolve_session(&self, token: &str) -> AppResult<Option<i32>> {
        (**self).resolve_session(token)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: SessionResolver + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_session_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("not authenticated"))?;

        let user_id = state
            .resolve_session(&token)?
            .ok_or_else(|| AppError::unauthorized("invalid authentication credentials"))?;

        Ok(AuthUser { id: user_id, token })
    }
}

/// Session token from the `token` cookie, falling back to a Bearer header.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Decodes and verifies a session token. Bad signatures, garbage input and
/// expired tokens all come back as `None`.
pub fn decode_claims(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| tracing::debug!(error = %e, "rejected session token"))
    .ok()?;

    if token_data.claims.is_expired() {
        return None;
    }
    Some(token_data.claims)
}
