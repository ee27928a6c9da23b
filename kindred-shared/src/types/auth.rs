use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token claims.
///
/// `jti` is random so two tokens minted for the same user within one second
/// still differ (the server keys sessions by token digest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_id: i32, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::new_v4(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Caller identity resolved from a live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub token: String,
}
