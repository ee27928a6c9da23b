use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use metrics::counter;

use kindred_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{InteractionKind, Like, NewInteraction, NewLike};
use crate::schema::{interactions, likes, users};
use crate::services::profile_service;

/// Result of a like or skip.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutcome {
    Liked(Like),
    Skipped { already_viewed: bool },
}

/// Records `viewer_id`'s decision about `target_id` in a single transaction.
///
/// Business-rule failures (`ProfileNotFound`, `CannotActOnSelf`) are raised
/// before anything is written. Any storage failure rolls the whole decision
/// back, interaction included, and surfaces as `InternalError`.
pub fn record_decision(
    conn: &mut SqliteConnection,
    viewer_id: i32,
    target_id: i32,
    kind: InteractionKind,
) -> AppResult<DecisionOutcome> {
    let outcome = conn
        .transaction::<_, AppError, _>(|conn| {
            if profile_service::find_active_profile(conn, target_id)?.is_none() {
                return Err(AppError::new(
                    ErrorCode::ProfileNotFound,
                    "target profile not found or inactive",
                ));
            }
            if viewer_id == target_id {
                return Err(AppError::new(ErrorCode::CannotActOnSelf, "cannot act on self"));
            }

            match kind {
                InteractionKind::Skip => skip(conn, viewer_id, target_id),
                InteractionKind::Like => like(conn, viewer_id, target_id).map(DecisionOutcome::Liked),
            }
        })
        .map_err(|e| match e {
            AppError::Database(ref err) if e.error_code() == ErrorCode::InternalError => {
                tracing::error!(viewer_id, target_id, %kind, error = %err, "decision rolled back");
                AppError::internal(format!("failed to record {kind}"))
            }
            other => other,
        })?;

    counter!("kindred_decisions_total", "kind" => kind.as_str()).increment(1);
    Ok(outcome)
}

pub fn like_profile(conn: &mut SqliteConnection, viewer_id: i32, target_id: i32) -> AppResult<Like> {
    match record_decision(conn, viewer_id, target_id, InteractionKind::Like)? {
        DecisionOutcome::Liked(like) => Ok(like),
        DecisionOutcome::Skipped { .. } => Err(AppError::internal("like recorded as skip")),
    }
}

/// Returns `true` when the target had already been seen and nothing was written.
pub fn skip_profile(conn: &mut SqliteConnection, viewer_id: i32, target_id: i32) -> AppResult<bool> {
    match record_decision(conn, viewer_id, target_id, InteractionKind::Skip)? {
        DecisionOutcome::Skipped { already_viewed } => Ok(already_viewed),
        DecisionOutcome::Liked(_) => Err(AppError::internal("skip recorded as like")),
    }
}

fn skip(conn: &mut SqliteConnection, viewer_id: i32, target_id: i32) -> AppResult<DecisionOutcome> {
    let seen: i64 = interactions::table
        .filter(interactions::viewer_id.eq(viewer_id))
        .filter(interactions::target_id.eq(target_id))
        .count()
        .get_result(conn)?;
    if seen > 0 {
        return Ok(DecisionOutcome::Skipped { already_viewed: true });
    }

    diesel::insert_into(interactions::table)
        .values(&NewInteraction {
            viewer_id,
            target_id,
            kind: InteractionKind::Skip.as_str(),
        })
        .execute(conn)?;

    tracing::debug!(viewer_id, target_id, "profile skipped");
    Ok(DecisionOutcome::Skipped { already_viewed: false })
}

fn like(conn: &mut SqliteConnection, viewer_id: i32, target_id: i32) -> AppResult<Like> {
    let now = Utc::now().naive_utc();

    diesel::insert_into(interactions::table)
        .values(&NewInteraction {
            viewer_id,
            target_id,
            kind: InteractionKind::Like.as_str(),
        })
        .on_conflict((interactions::viewer_id, interactions::target_id))
        .do_update()
        .set((
            interactions::kind.eq(InteractionKind::Like.as_str()),
            interactions::updated_at.eq(now),
        ))
        .execute(conn)?;

    let existing = likes::table
        .filter(likes::liker_id.eq(viewer_id))
        .filter(likes::target_id.eq(target_id))
        .first::<Like>(conn)
        .optional()?;
    if let Some(existing) = existing {
        return Ok(existing);
    }

    let reverse = likes::table
        .filter(likes::liker_id.eq(target_id))
        .filter(likes::target_id.eq(viewer_id))
        .first::<Like>(conn)
        .optional()?;
    let target_is_celebrity: bool = users::table
        .find(target_id)
        .select(users::is_celebrity)
        .first(conn)?;

    let like = diesel::insert_into(likes::table)
        .values(&NewLike {
            liker_id: viewer_id,
            target_id,
            mutual: reverse.is_some() || target_is_celebrity,
        })
        .get_result::<Like>(conn)?;

    match reverse {
        Some(reverse) if !reverse.mutual => {
            diesel::update(likes::table.find(reverse.id))
                .set((likes::mutual.eq(true), likes::updated_at.eq(now)))
                .execute(conn)?;
        }
        Some(_) => {}
        None if target_is_celebrity => {
            diesel::insert_into(likes::table)
                .values(&NewLike {
                    liker_id: target_id,
                    target_id: viewer_id,
                    mutual: true,
                })
                .execute(conn)?;
        }
        None => {}
    }

    counter!("kindred_likes_total").increment(1);
    if like.mutual {
        counter!("kindred_matches_total").increment(1);
        tracing::info!(like_id = like.id, viewer_id, target_id, "new match");
    } else {
        tracing::debug!(like_id = like.id, viewer_id, target_id, "like recorded");
    }

    Ok(like)
}
