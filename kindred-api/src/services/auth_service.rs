use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use kindred_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewUser, Profile, User};
use crate::schema::users;
use crate::services::{profile_service, token_service};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account fields for a new user; the password is already hashed.
#[derive(Debug)]
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub is_celebrity: bool,
}

/// Creates the user and its default profile in one transaction.
pub fn register_user(conn: &mut SqliteConnection, account: &NewAccount<'_>) -> AppResult<(User, Profile)> {
    let email = normalize_email(account.email);

    conn.transaction::<_, AppError, _>(|conn| {
        let email_taken: i64 = users::table
            .filter(users::email.eq(&email))
            .count()
            .get_result(conn)?;
        if email_taken > 0 {
            return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
        }

        let username_taken: i64 = users::table
            .filter(users::username.eq(account.username))
            .count()
            .get_result(conn)?;
        if username_taken > 0 {
            return Err(AppError::new(ErrorCode::UsernameTaken, "username already taken"));
        }

        let user = diesel::insert_into(users::table)
            .values(&NewUser {
                email: &email,
                username: account.username,
                password_hash: account.password_hash,
                is_celebrity: account.is_celebrity,
            })
            .get_result::<User>(conn)?;

        let profile = profile_service::create_default_profile(conn, &user)?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok((user, profile))
    })
}

/// Registers the account and signs it in. Nothing is kept unless the session
/// token was issued too.
pub fn register_with_session(
    conn: &mut SqliteConnection,
    account: &NewAccount<'_>,
    secret: &str,
    ttl_secs: i64,
) -> AppResult<(User, String)> {
    conn.transaction::<_, AppError, _>(|conn| {
        let (user, _) = register_user(conn, account)?;
        let token = token_service::issue_session(conn, user.id, secret, ttl_secs)?;
        Ok((user, token))
    })
}

/// Checks an email/password pair. Unknown email and wrong password both yield `None`.
pub fn authenticate(conn: &mut SqliteConnection, email: &str, password: &str) -> AppResult<Option<User>> {
    let user = users::table
        .filter(users::email.eq(normalize_email(email)))
        .first::<User>(conn)
        .optional()?;

    let Some(user) = user else {
        return Ok(None);
    };

    if !verify_password(password, &user.password_hash)? {
        return Ok(None);
    }
    Ok(Some(user))
}

pub fn find_user(conn: &mut SqliteConnection, user_id: i32) -> AppResult<Option<User>> {
    Ok(users::table.find(user_id).first::<User>(conn).optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn hash_roundtrip_and_mismatch() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn register_creates_active_profile_named_after_username() {
        let mut conn = test_support::connection();
        let (user, profile) = register_user(
            &mut conn,
            &NewAccount {
                email: "Alice@Example.com",
                username: "alice",
                password_hash: "x",
                is_celebrity: false,
            },
        )
        .unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.display_name, "alice");
        assert!(profile.is_active);
    }

    #[test]
    fn duplicate_email_and_username_are_rejected() {
        let mut conn = test_support::connection();
        test_support::create_user(&mut conn, "alice");

        let err = register_user(
            &mut conn,
            &NewAccount {
                email: "alice@test.com",
                username: "someone-else",
                password_hash: "x",
                is_celebrity: false,
            },
        )
        .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::EmailAlreadyExists);

        let err = register_user(
            &mut conn,
            &NewAccount {
                email: "other@test.com",
                username: "alice",
                password_hash: "x",
                is_celebrity: false,
            },
        )
        .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::UsernameTaken);

        let count: i64 = users::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn register_with_session_issues_a_usable_token() {
        let mut conn = test_support::connection();
        let account = NewAccount {
            email: "dana@test.com",
            username: "dana",
            password_hash: "x",
            is_celebrity: false,
        };

        let (user, token) = register_with_session(&mut conn, &account, "secret", 3600).unwrap();
        let resolved = token_service::resolve_session(&mut conn, &token, "secret").unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id));
    }

    #[test]
    fn failed_session_insert_rolls_back_registration() {
        use diesel::connection::SimpleConnection;

        let mut conn = test_support::connection();
        conn.batch_execute(
            "CREATE TRIGGER reject_sessions BEFORE INSERT ON sessions
             BEGIN SELECT RAISE(ABORT, 'sessions are read-only'); END;",
        )
        .unwrap();

        let account = NewAccount {
            email: "dana@test.com",
            username: "dana",
            password_hash: "x",
            is_celebrity: false,
        };
        let err = register_with_session(&mut conn, &account, "secret", 3600).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InternalError);

        let users: i64 = users::table.count().get_result(&mut conn).unwrap();
        assert_eq!(users, 0);
        let profiles: i64 = crate::schema::profiles::table.count().get_result(&mut conn).unwrap();
        assert_eq!(profiles, 0);

        // the same details can register once sessions work again
        conn.batch_execute("DROP TRIGGER reject_sessions;").unwrap();
        assert!(register_with_session(&mut conn, &account, "secret", 3600).is_ok());
    }

    #[test]
    fn authenticate_checks_email_and_password() {
        let mut conn = test_support::connection();
        let hash = hash_password("pass1234").unwrap();
        let (user, _) = register_user(
            &mut conn,
            &NewAccount {
                email: "bob@test.com",
                username: "bob",
                password_hash: &hash,
                is_celebrity: false,
            },
        )
        .unwrap();

        let found = authenticate(&mut conn, "BOB@test.com", "pass1234").unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(authenticate(&mut conn, "bob@test.com", "wrong").unwrap().is_none());
        assert!(authenticate(&mut conn, "nobody@test.com", "pass1234").unwrap().is_none());
    }
}
