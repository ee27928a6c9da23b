use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use kindred_shared::errors::{AppError, AppResult, ErrorCode};
use kindred_shared::middleware::extract_session_token;
use kindred_shared::types::auth::AuthUser;
use kindred_shared::types::{ApiResponse, MessageResponse};

use crate::models::UserResponse;
use crate::services::auth_service::{self, NewAccount};
use crate::services::token_service;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 3, max = 100, message = "username must be 3-100 characters"))]
    pub username: String,
    #[validate(length(min = 6, max = 100, message = "password must be 6-100 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let password_hash = auth_service::hash_password(&req.password)?;
    let mut conn = state.conn()?;

    let (user, token) = auth_service::register_with_session(
        &mut conn,
        &NewAccount {
            email: &req.email,
            username: &req.username,
            password_hash: &password_hash,
            is_celebrity: false,
        },
        &state.config.jwt_secret,
        state.config.session_ttl_secs,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthResponse { user: user.into(), token })),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let mut conn = state.conn()?;

    let user = auth_service::authenticate(&mut conn, &req.email, &req.password)?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"))?;

    let token = token_service::issue_session(
        &mut conn,
        user.id,
        &state.config.jwt_secret,
        state.config.session_ttl_secs,
    )?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(ApiResponse::ok(AuthResponse { user: user.into(), token })))
}

/// Revokes whichever token the caller presents. Unknown tokens are not an error.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<ApiResponse<MessageResponse>>> {
    let token = extract_session_token(&headers)
        .ok_or_else(|| AppError::new(ErrorCode::MissingSessionToken, "no session token provided"))?;

    let mut conn = state.conn()?;
    let revoked = token_service::revoke_session(&mut conn, &token)?;
    tracing::debug!(revoked, "logout");

    Ok(Json(ApiResponse::ok(MessageResponse::new("successfully logged out"))))
}

pub async fn me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let mut conn = state.conn()?;

    let account = auth_service::find_user(&mut conn, user.id)?
        .ok_or_else(|| AppError::unauthorized("invalid authentication credentials"))?;

    Ok(Json(ApiResponse::ok(account.into())))
}
