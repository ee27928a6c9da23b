use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use kindred_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewProfile, Profile, ProfileChangeset, ProfileUpdate, PublicProfile, User};
use crate::schema::profiles;

/// Creates the default profile for a newly registered user: active, and
/// displayed under the username until the owner picks a display name.
pub fn create_default_profile(conn: &mut SqliteConnection, user: &User) -> AppResult<Profile> {
    let profile = diesel::insert_into(profiles::table)
        .values(&NewProfile {
            user_id: user.id,
            display_name: &user.username,
            ..Default::default()
        })
        .get_result::<Profile>(conn)?;

    tracing::info!(
        profile_id = profile.id,
        user_id = user.id,
        "default profile created"
    );

    Ok(profile)
}

pub fn get_profile(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Profile> {
    profiles::table
        .filter(profiles::user_id.eq(user_id))
        .first::<Profile>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

/// Active profile of `user_id`, if there is one. Closed profiles are invisible here.
pub fn find_active_profile(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Option<Profile>> {
    Ok(profiles::table
        .filter(profiles::user_id.eq(user_id))
        .filter(profiles::is_active.eq(true))
        .first::<Profile>(conn)
        .optional()?)
}

pub fn get_public_profile(conn: &mut SqliteConnection, user_id: i32) -> AppResult<PublicProfile> {
    find_active_profile(conn, user_id)?
        .map(PublicProfile::from)
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

/// Applies only the fields present in `update`.
pub fn update_profile(
    conn: &mut SqliteConnection,
    user_id: i32,
    update: ProfileUpdate,
) -> AppResult<Profile> {
    let profile = get_profile(conn, user_id)?;

    let updated = diesel::update(profiles::table.find(profile.id))
        .set(&ProfileChangeset::from(update))
        .get_result::<Profile>(conn)?;

    tracing::info!(profile_id = updated.id, user_id, "profile updated");
    Ok(updated)
}

/// Marks the profile inactive. Likes, interactions and matches stay in place.
/// Closing an already closed profile is a no-op.
pub fn close_profile(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Profile> {
    conn.transaction::<_, AppError, _>(|conn| {
        let profile = get_profile(conn, user_id)?;
        if !profile.is_active {
            return Ok(profile);
        }

        let closed = diesel::update(profiles::table.find(profile.id))
            .set((
                profiles::is_active.eq(false),
                profiles::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .get_result::<Profile>(conn)?;

        tracing::info!(profile_id = closed.id, user_id, "profile closed");
        Ok(closed)
    })
}
