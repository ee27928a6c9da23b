use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use jsonwebtoken::{encode, EncodingKey, Header};
use sha2::{Digest, Sha256};

use kindred_shared::errors::{AppError, AppResult};
use kindred_shared::middleware::decode_claims;
use kindred_shared::types::auth::Claims;

use crate::models::{NewSession, Session, User};
use crate::schema::{sessions, users};

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn sign_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}

/// Issues a session token for `user_id` and records its digest server-side.
///
/// Expired sessions of the same user are dropped on the way.
pub fn issue_session(
    conn: &mut SqliteConnection,
    user_id: i32,
    secret: &str,
    ttl_secs: i64,
) -> AppResult<String> {
    let claims = Claims::new(user_id, ttl_secs);
    let token = sign_token(&claims, secret)?;
    let now = Utc::now().naive_utc();

    conn.transaction::<_, AppError, _>(|conn| {
        diesel::delete(
            sessions::table
                .filter(sessions::user_id.eq(user_id))
                .filter(sessions::expires_at.le(now)),
        )
        .execute(conn)?;

        diesel::insert_into(sessions::table)
            .values(&NewSession {
                user_id,
                token_hash: hash_token(&token),
                expires_at: now + Duration::seconds(ttl_secs),
            })
            .execute(conn)?;
        Ok(())
    })?;

    tracing::debug!(user_id, session_id = %claims.jti, "session issued");
    Ok(token)
}

/// Resolves a token to its user. Malformed or expired tokens, missing or
/// expired session rows, and sessions of deleted users all resolve to `None`.
pub fn resolve_session(
    conn: &mut SqliteConnection,
    token: &str,
    secret: &str,
) -> AppResult<Option<User>> {
    let Some(claims) = decode_claims(token, secret) else {
        return Ok(None);
    };

    let session = sessions::table
        .filter(sessions::token_hash.eq(hash_token(token)))
        .filter(sessions::expires_at.gt(Utc::now().naive_utc()))
        .first::<Session>(conn)
        .optional()?;

    match session {
        Some(session) if session.user_id == claims.sub => Ok(users::table
            .find(session.user_id)
            .first::<User>(conn)
            .optional()?),
        _ => Ok(None),
    }
}

/// Deletes the session behind `token`. Returns `false` when there was none,
/// so revoking twice is harmless.
pub fn revoke_session(conn: &mut SqliteConnection, token: &str) -> AppResult<bool> {
    let deleted = diesel::delete(sessions::table.filter(sessions::token_hash.eq(hash_token(token))))
        .execute(conn)?;
    Ok(deleted > 0)
}
