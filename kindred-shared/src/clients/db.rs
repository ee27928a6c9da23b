use std::path::Path;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Per-connection pragmas applied whenever the pool opens a connection.
#[derive(Debug, Clone, Copy)]
pub struct SqlitePragmas {
    pub enable_wal: bool,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        let mut pragmas = format!(
            "PRAGMA foreign_keys = ON;\nPRAGMA busy_timeout = {BUSY_TIMEOUT_MS};\n"
        );
        if self.enable_wal {
            pragmas.push_str("PRAGMA journal_mode = WAL;\nPRAGMA synchronous = NORMAL;\n");
        }
        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn is_in_memory(database_url: &str) -> bool {
    database_url == ":memory:" || database_url.contains("mode=memory")
}

/// Builds the connection pool, creating the database's parent directory first.
///
/// An in-memory database lives and dies with its connection, so callers that
/// pass `:memory:` should use `max_size = 1` to keep a single shared database.
pub fn create_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let in_memory = is_in_memory(database_url);
    if !in_memory {
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_secs(10))
        .test_on_check_out(true)
        .connection_customizer(Box::new(SqlitePragmas { enable_wal: !in_memory }))
        .build(manager)?;

    tracing::info!(database_url, max_size, "database connection pool created");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;
    use diesel::sql_types::Integer;

    use super::*;

    #[derive(QueryableByName)]
    struct Pragma {
        #[diesel(sql_type = Integer)]
        foreign_keys: i32,
    }

    #[test]
    fn pooled_connections_enforce_foreign_keys() {
        let pool = create_pool(":memory:", 1).unwrap();
        let mut conn = pool.get().unwrap();
        let pragma = diesel::sql_query("PRAGMA foreign_keys")
            .get_result::<Pragma>(&mut conn)
            .unwrap();
        assert_eq!(pragma.foreign_keys, 1);
    }

    #[test]
    fn memory_urls_are_detected() {
        assert!(is_in_memory(":memory:"));
        assert!(is_in_memory("file:test?mode=memory&cache=shared"));
        assert!(!is_in_memory("data/kindred.db"));
    }
}
