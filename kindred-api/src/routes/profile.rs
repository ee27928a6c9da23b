use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use kindred_shared::errors::{AppError, AppResult, ErrorCode};
use kindred_shared::types::auth::AuthUser;
use kindred_shared::types::ApiResponse;

use crate::models::{Profile, ProfileUpdate, PublicProfile};
use crate::services::profile_service;
use crate::AppState;

pub async fn get_my_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.conn()?;
    let profile = profile_service::get_profile(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

pub async fn update_my_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProfileUpdate>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let mut conn = state.conn()?;
    let profile = profile_service::update_profile(&mut conn, user.id, req)?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /profile/profiles/:user_id - active profiles only
pub async fn get_public_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<ApiResponse<PublicProfile>>> {
    let mut conn = state.conn()?;
    let profile = profile_service::get_public_profile(&mut conn, user_id)?;
    Ok(Json(ApiResponse::ok(profile)))
}
