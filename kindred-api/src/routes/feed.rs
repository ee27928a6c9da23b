use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use kindred_shared::errors::AppResult;
use kindred_shared::types::auth::AuthUser;
use kindred_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::{FeedProfile, Like};
use crate::services::match_service::MatchList;
use crate::services::{feed_service, like_service, match_service};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipStatus {
    Skipped,
    AlreadyViewed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkipResponse {
    pub status: SkipStatus,
}

/// GET /feed and /likes/feed
pub async fn get_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<FeedProfile>>>> {
    let mut conn = state.conn()?;
    let page = feed_service::compose_feed(&mut conn, user.id, &params)?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /likes/:target_id and /feed/:target_id/like
pub async fn like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<i32>,
) -> AppResult<Json<ApiResponse<Like>>> {
    let mut conn = state.conn()?;
    let like = like_service::like_profile(&mut conn, user.id, target_id)?;
    Ok(Json(ApiResponse::ok(like)))
}

pub async fn skip(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<i32>,
) -> AppResult<Json<ApiResponse<SkipResponse>>> {
    let mut conn = state.conn()?;
    let status = if like_service::skip_profile(&mut conn, user.id, target_id)? {
        SkipStatus::AlreadyViewed
    } else {
        SkipStatus::Skipped
    };
    Ok(Json(ApiResponse::ok(SkipResponse { status })))
}

/// GET /feed/matches and /likes/matches
pub async fn matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<MatchList>>> {
    let mut conn = state.conn()?;
    let list = match_service::list_matches(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(list)))
}
