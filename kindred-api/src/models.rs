use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schema::{interactions, likes, profiles, sessions, users};

// --- Enums stored as text ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer_not_to_say",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "prefer_not_to_say" => Ok(Gender::PreferNotToSay),
            _ => Err(format!("unknown gender: {s}")),
        }
    }
}

/// A viewer's decision about a target profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Skip,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Skip => "skip",
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(InteractionKind::Like),
            "skip" => Ok(InteractionKind::Skip),
            _ => Err(format!("unknown interaction kind: {s}")),
        }
    }
}

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_celebrity: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub is_celebrity: bool,
}

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: i32,
    pub user_id: i32,
    pub display_name: String,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub hobbies: Option<String>,
    pub favorite_joke: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Profile {
    pub fn gender(&self) -> Option<Gender> {
        self.gender.as_deref().and_then(|g| g.parse().ok())
    }
}

#[derive(Debug, Insertable, Default)]
#[diesel(table_name = profiles)]
pub struct NewProfile<'a> {
    pub user_id: i32,
    pub display_name: &'a str,
    pub gender: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub hobbies: Option<&'a str>,
    pub favorite_joke: Option<&'a str>,
}

/// Partial update sent by the profile owner; absent fields stay as they are.
#[derive(Debug, Deserialize, Validate, Default)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 255, message = "display_name must be 1-255 characters"))]
    pub display_name: Option<String>,
    pub gender: Option<Gender>,
    #[validate(length(max = 500, message = "avatar_url must be at most 500 characters"))]
    pub avatar_url: Option<String>,
    #[validate(length(max = 1000, message = "bio must be at most 1000 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 1000, message = "hobbies must be at most 1000 characters"))]
    pub hobbies: Option<String>,
    #[validate(length(max = 500, message = "favorite_joke must be at most 500 characters"))]
    pub favorite_joke: Option<String>,
    pub is_active: Option<bool>,
}

/// Column changes for a partial profile update; `None` leaves a column untouched.
#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = profiles)]
pub struct ProfileChangeset {
    pub display_name: Option<String>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub hobbies: Option<String>,
    pub favorite_joke: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<ProfileUpdate> for ProfileChangeset {
    fn from(update: ProfileUpdate) -> Self {
        Self {
            display_name: update.display_name,
            gender: update.gender.map(|g| g.as_str().to_string()),
            avatar_url: update.avatar_url,
            bio: update.bio,
            hobbies: update.hobbies,
            favorite_joke: update.favorite_joke,
            is_active: update.is_active,
            updated_at: Some(chrono::Utc::now().naive_utc()),
        }
    }
}

// --- Session ---

#[derive(Debug, Queryable, Identifiable)]
#[diesel(table_name = sessions)]
pub struct Session {
    pub id: i32,
    pub user_id: i32,
    pub token_hash: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub user_id: i32,
    pub token_hash: String,
    pub expires_at: NaiveDateTime,
}

// --- Interaction ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = interactions)]
pub struct Interaction {
    pub id: i32,
    pub viewer_id: i32,
    pub target_id: i32,
    pub kind: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = interactions)]
pub struct NewInteraction<'a> {
    pub viewer_id: i32,
    pub target_id: i32,
    pub kind: &'a str,
}

// --- Like ---

#[derive(Debug, Queryable, Identifiable, Serialize, Deserialize, Clone, PartialEq)]
#[diesel(table_name = likes)]
pub struct Like {
    pub id: i32,
    pub liker_id: i32,
    pub target_id: i32,
    pub mutual: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub liker_id: i32,
    pub target_id: i32,
    pub mutual: bool,
}

// --- Response projections ---

/// Account view returned to its owner; never carries the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub is_celebrity: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            is_celebrity: user.is_celebrity,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Limited-exposure card shown in the feed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FeedProfile {
    pub id: i32,
    pub user_id: i32,
    pub display_name: String,
    pub gender: Option<Gender>,
    pub avatar_url: Option<String>,
    pub favorite_joke: Option<String>,
}

impl From<Profile> for FeedProfile {
    fn from(profile: Profile) -> Self {
        Self {
            gender: profile.gender(),
            id: profile.id,
            user_id: profile.user_id,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            favorite_joke: profile.favorite_joke,
        }
    }
}

/// Minimal counterpart info attached to a match.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MatchProfile {
    pub id: i32,
    pub user_id: i32,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub favorite_joke: Option<String>,
}

impl From<Profile> for MatchProfile {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            favorite_joke: profile.favorite_joke,
        }
    }
}

/// What anyone may see of an active profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: i32,
    pub user_id: i32,
    pub display_name: String,
    pub gender: Option<Gender>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub hobbies: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<Profile> for PublicProfile {
    fn from(profile: Profile) -> Self {
        Self {
            gender: profile.gender(),
            id: profile.id,
            user_id: profile.user_id,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            bio: profile.bio,
            hobbies: profile.hobbies,
            created_at: profile.created_at,
        }
    }
}
