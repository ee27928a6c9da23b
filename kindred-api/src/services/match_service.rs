use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use kindred_shared::errors::AppResult;

use crate::models::{Like, MatchProfile, Profile};
use crate::schema::{likes, profiles};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchEntry {
    pub id: i32,
    pub liker_id: i32,
    pub target_id: i32,
    pub created_at: NaiveDateTime,
    pub matched_with: MatchProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchList {
    pub matches: Vec<MatchEntry>,
    pub total: usize,
}

/// Everyone `user_id` shares a mutual like with, one entry per counterpart.
///
/// When both directions of a pair are stored as mutual, the edge with the
/// lowest id is reported. Counterparts whose profile is closed are left out;
/// their edges are kept.
pub fn list_matches(conn: &mut SqliteConnection, user_id: i32) -> AppResult<MatchList> {
    let edges = likes::table
        .filter(likes::mutual.eq(true))
        .filter(likes::liker_id.eq(user_id).or(likes::target_id.eq(user_id)))
        .order(likes::id.asc())
        .load::<Like>(conn)?;

    let mut seen = HashSet::new();
    let canonical: Vec<(i32, Like)> = edges
        .into_iter()
        .filter_map(|edge| {
            let counterpart = if edge.liker_id == user_id { edge.target_id } else { edge.liker_id };
            seen.insert(counterpart).then_some((counterpart, edge))
        })
        .collect();

    let counterpart_ids: Vec<i32> = canonical.iter().map(|(id, _)| *id).collect();
    let mut active: HashMap<i32, Profile> = profiles::table
        .filter(profiles::user_id.eq_any(&counterpart_ids))
        .filter(profiles::is_active.eq(true))
        .load::<Profile>(conn)?
        .into_iter()
        .map(|p| (p.user_id, p))
        .collect();

    let matches: Vec<MatchEntry> = canonical
        .into_iter()
        .filter_map(|(counterpart, edge)| {
            active.remove(&counterpart).map(|profile| MatchEntry {
                id: edge.id,
                liker_id: edge.liker_id,
                target_id: edge.target_id,
                created_at: edge.created_at,
                matched_with: MatchProfile::from(profile),
            })
        })
        .collect();

    tracing::debug!(user_id, matches = matches.len(), "matches listed");
    Ok(MatchList { total: matches.len(), matches })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewLike;
    use crate::services::{like_service, profile_service};
    use crate::test_support;

    fn counterpart_ids(list: &MatchList) -> Vec<i32> {
        list.matches.iter().map(|m| m.matched_with.user_id).collect()
    }

    #[test]
    fn matches_are_symmetric() {
        let mut conn = test_support::connection();
        let a = test_support::create_user(&mut conn, "alice");
        let b = test_support::create_user(&mut conn, "bob");
        let c = test_support::create_user(&mut conn, "carol");

        like_service::like_profile(&mut conn, a.id, b.id).unwrap();
        like_service::like_profile(&mut conn, b.id, a.id).unwrap();
        // one-way
        like_service::like_profile(&mut conn, a.id, c.id).unwrap();

        assert_eq!(counterpart_ids(&list_matches(&mut conn, a.id).unwrap()), vec![b.id]);
        assert_eq!(counterpart_ids(&list_matches(&mut conn, b.id).unwrap()), vec![a.id]);
        assert_eq!(list_matches(&mut conn, c.id).unwrap().total, 0);
    }

    #[test]
    fn duplicate_mutual_edges_collapse_to_lowest_id() {
        let mut conn = test_support::connection();
        let a = test_support::create_user(&mut conn, "alice");
        let b = test_support::create_user(&mut conn, "bob");

        like_service::like_profile(&mut conn, a.id, b.id).unwrap();
        let second = like_service::like_profile(&mut conn, b.id, a.id).unwrap();

        let list = list_matches(&mut conn, b.id).unwrap();
        assert_eq!(list.total, 1);
        assert!(list.matches[0].id < second.id);
        assert_eq!(list.matches[0].liker_id, a.id);
    }

    #[test]
    fn celebrity_match_shows_up_immediately() {
        let mut conn = test_support::connection();
        let fan = test_support::create_user(&mut conn, "fan");
        let star = test_support::create_celebrity(&mut conn, "star");

        like_service::like_profile(&mut conn, fan.id, star.id).unwrap();
        let list = list_matches(&mut conn, fan.id).unwrap();
        assert_eq!(counterpart_ids(&list), vec![star.id]);
        assert_eq!(list.matches[0].matched_with.display_name, "star");
    }

    #[test]
    fn closed_counterpart_is_hidden_but_edge_survives() {
        let mut conn = test_support::connection();
        let a = test_support::create_user(&mut conn, "alice");
        let b = test_support::create_user(&mut conn, "bob");
        like_service::like_profile(&mut conn, a.id, b.id).unwrap();
        like_service::like_profile(&mut conn, b.id, a.id).unwrap();

        profile_service::close_profile(&mut conn, b.id).unwrap();
        assert_eq!(list_matches(&mut conn, a.id).unwrap().total, 0);

        let edges: i64 = likes::table.filter(likes::mutual.eq(true)).count().get_result(&mut conn).unwrap();
        assert_eq!(edges, 2);
    }

    #[test]
    fn non_mutual_edges_are_not_matches() {
        let mut conn = test_support::connection();
        let a = test_support::create_user(&mut conn, "alice");
        let b = test_support::create_user(&mut conn, "bob");
        diesel::insert_into(likes::table)
            .values(&NewLike { liker_id: a.id, target_id: b.id, mutual: false })
            .execute(&mut conn)
            .unwrap();

        assert!(list_matches(&mut conn, a.id).unwrap().matches.is_empty());
        assert!(list_matches(&mut conn, b.id).unwrap().matches.is_empty());
    }
}
