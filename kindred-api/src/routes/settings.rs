use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use kindred_shared::errors::AppResult;
use kindred_shared::types::auth::AuthUser;
use kindred_shared::types::ApiResponse;

use crate::services::profile_service;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct CloseProfileResponse {
    pub success: bool,
    pub is_active: bool,
    pub message: String,
}

pub async fn close_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<CloseProfileResponse>>> {
    let mut conn = state.conn()?;
    let profile = profile_service::close_profile(&mut conn, user.id)?;

    Ok(Json(ApiResponse::ok(CloseProfileResponse {
        success: true,
        is_active: profile.is_active,
        message: "profile closed successfully".into(),
    })))
}
