use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use kindred_shared::errors::{AppError, AppResult};
use kindred_shared::types::{Paginated, PaginationParams};

use crate::models::{FeedProfile, Profile};
use crate::schema::{interactions, likes, profiles};

/// Active profiles `viewer_id` has not decided about yet, excluding their own.
///
/// Profiles are excluded through the interaction log and through like edges
/// alike: likes written before interactions were tracked only exist as edges.
fn candidates(viewer_id: i32) -> profiles::BoxedQuery<'static, Sqlite> {
    let decided = interactions::table
        .select(interactions::target_id)
        .filter(interactions::viewer_id.eq(viewer_id));
    let liked = likes::table
        .select(likes::target_id)
        .filter(likes::liker_id.eq(viewer_id));

    profiles::table
        .filter(profiles::user_id.ne(viewer_id))
        .filter(profiles::is_active.eq(true))
        .filter(profiles::user_id.ne_all(decided))
        .filter(profiles::user_id.ne_all(liked))
        .into_boxed()
}

/// One page of the viewer's feed, ordered by profile id.
///
/// `total` is recounted on every call, so pages shift when candidates drop out
/// between requests.
pub fn compose_feed(
    conn: &mut SqliteConnection,
    viewer_id: i32,
    params: &PaginationParams,
) -> AppResult<Paginated<FeedProfile>> {
    params.validate()?;

    let total: i64 = candidates(viewer_id).count().get_result(conn)?;
    let total = u64::try_from(total).unwrap_or_default();

    // SQLite reads a negative OFFSET as 0, so anything past the end never reaches the query.
    let items = match i64::try_from(params.offset()) {
        Ok(offset) if params.offset() < total => {
            let limit = i64::try_from(params.limit())
                .map_err(|_| AppError::Validation("size out of range".into()))?;
            candidates(viewer_id)
                .order(profiles::id.asc())
                .offset(offset)
                .limit(limit)
                .load::<Profile>(conn)?
                .into_iter()
                .map(FeedProfile::from)
                .collect::<Vec<_>>()
        }
        _ => Vec::new(),
    };

    tracing::debug!(
        viewer_id,
        page = params.page,
        returned = items.len(),
        total,
        "feed composed"
    );

    Ok(Paginated::new(items, total, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InteractionKind, NewLike};
    use crate::services::{like_service, profile_service};
    use crate::test_support;
    use kindred_shared::errors::ErrorCode;

    fn user_ids(page: &Paginated<FeedProfile>) -> Vec<i32> {
        page.items.iter().map(|p| p.user_id).collect()
    }

    #[test]
    fn feed_never_contains_viewer() {
        let mut conn = test_support::connection();
        let users: Vec<_> = (0..5)
            .map(|i| test_support::create_user(&mut conn, &format!("user{i}")))
            .collect();
        let viewer = users[2].id;

        for size in 1..=6 {
            for page in 1..=6 {
                let feed = compose_feed(&mut conn, viewer, &PaginationParams::new(page, size)).unwrap();
                assert!(!user_ids(&feed).contains(&viewer));
                assert_eq!(feed.total, 4);
            }
        }
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let mut conn = test_support::connection();
        let viewer = test_support::create_user(&mut conn, "viewer");
        for i in 0..7 {
            test_support::create_user(&mut conn, &format!("cand{i}"));
        }

        let first = compose_feed(&mut conn, viewer.id, &PaginationParams::new(1, 3)).unwrap();
        assert_eq!(first.items.len(), 3);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let last = compose_feed(&mut conn, viewer.id, &PaginationParams::new(3, 3)).unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_next);
        assert!(last.has_prev);

        let exact = compose_feed(&mut conn, viewer.id, &PaginationParams::new(1, 7)).unwrap();
        assert_eq!(exact.items.len(), 7);
        assert!(!exact.has_next);

        let beyond = compose_feed(&mut conn, viewer.id, &PaginationParams::new(9, 3)).unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 7);
    }

    #[test]
    fn pages_past_the_end_are_empty() {
        let mut conn = test_support::connection();
        let viewer = test_support::create_user(&mut conn, "viewer");
        for i in 0..3 {
            test_support::create_user(&mut conn, &format!("cand{i}"));
        }

        for page in [4, 100_000_000_000_000_000, 184_467_440_737_095_517, u64::MAX] {
            let feed = compose_feed(&mut conn, viewer.id, &PaginationParams::new(page, 1)).unwrap();
            assert!(feed.items.is_empty(), "page {page}");
            assert_eq!(feed.total, 3);
            assert!(!feed.has_next);
            assert!(feed.has_prev);

            let feed = compose_feed(&mut conn, viewer.id, &PaginationParams::new(page, 100)).unwrap();
            assert!(feed.items.is_empty(), "page {page}");
        }
    }

    #[test]
    fn pages_are_ordered_by_profile_id() {
        let mut conn = test_support::connection();
        let viewer = test_support::create_user(&mut conn, "viewer");
        for i in 0..4 {
            test_support::create_user(&mut conn, &format!("cand{i}"));
        }

        let mut seen = Vec::new();
        for page in 1..=2 {
            let feed = compose_feed(&mut conn, viewer.id, &PaginationParams::new(page, 2)).unwrap();
            seen.extend(feed.items.iter().map(|p| p.id));
        }
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(seen, sorted);
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn decided_and_closed_profiles_drop_out() {
        let mut conn = test_support::connection();
        let viewer = test_support::create_user(&mut conn, "viewer");
        let liked = test_support::create_user(&mut conn, "liked");
        let skipped = test_support::create_user(&mut conn, "skipped");
        let closed = test_support::create_user(&mut conn, "closed");
        let fresh = test_support::create_user(&mut conn, "fresh");

        like_service::record_decision(&mut conn, viewer.id, liked.id, InteractionKind::Like).unwrap();
        like_service::record_decision(&mut conn, viewer.id, skipped.id, InteractionKind::Skip).unwrap();
        profile_service::close_profile(&mut conn, closed.id).unwrap();

        let feed = compose_feed(&mut conn, viewer.id, &PaginationParams::default()).unwrap();
        assert_eq!(user_ids(&feed), vec![fresh.id]);
        assert_eq!(feed.total, 1);
    }

    #[test]
    fn like_edge_without_interaction_still_excludes() {
        let mut conn = test_support::connection();
        let viewer = test_support::create_user(&mut conn, "viewer");
        let target = test_support::create_user(&mut conn, "target");

        diesel::insert_into(likes::table)
            .values(&NewLike { liker_id: viewer.id, target_id: target.id, mutual: false })
            .execute(&mut conn)
            .unwrap();

        let feed = compose_feed(&mut conn, viewer.id, &PaginationParams::default()).unwrap();
        assert!(feed.items.is_empty());
        assert_eq!(feed.total, 0);
    }

    #[test]
    fn being_liked_does_not_hide_the_liker() {
        let mut conn = test_support::connection();
        let viewer = test_support::create_user(&mut conn, "viewer");
        let admirer = test_support::create_user(&mut conn, "admirer");
        like_service::record_decision(&mut conn, admirer.id, viewer.id, InteractionKind::Like).unwrap();

        let feed = compose_feed(&mut conn, viewer.id, &PaginationParams::default()).unwrap();
        assert_eq!(user_ids(&feed), vec![admirer.id]);
    }

    #[test]
    fn invalid_page_params_are_rejected() {
        let mut conn = test_support::connection();
        let viewer = test_support::create_user(&mut conn, "viewer");

        for params in [PaginationParams::new(0, 10), PaginationParams::new(1, 0), PaginationParams::new(1, 101)] {
            let err = compose_feed(&mut conn, viewer.id, &params).unwrap_err();
            assert_eq!(err.error_code(), ErrorCode::ValidationError);
        }
    }
}
