use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::run_migrations;
use crate::models::User;
use crate::services::auth_service::{register_user, NewAccount};

// Argon2 is too slow in debug builds to run per test user; nothing here logs in.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGVzdHNhbHQ$dGVzdGhhc2g";

pub(crate) fn connection() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    conn.batch_execute("PRAGMA foreign_keys = ON;").unwrap();
    run_migrations(&mut conn).unwrap();
    conn
}

fn create_account(conn: &mut SqliteConnection, name: &str, is_celebrity: bool) -> User {
    let email = format!("{name}@test.com");
    let (user, _) = register_user(
        conn,
        &NewAccount {
            email: &email,
            username: name,
            password_hash: DUMMY_HASH,
            is_celebrity,
        },
    )
    .unwrap();
    user
}

pub(crate) fn create_user(conn: &mut SqliteConnection, name: &str) -> User {
    create_account(conn, name, false)
}

pub(crate) fn create_celebrity(conn: &mut SqliteConnection, name: &str) -> User {
    create_account(conn, name, true)
}
