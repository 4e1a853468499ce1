pub mod contact;
pub mod engagement;
pub mod models;
pub mod posts;
pub mod users;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

use crate::state::DbPool;

pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial",
    include_str!("../../migrations/001_initial.sql"),
)];

fn configure_connection(conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )
}

pub fn create_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let manager = SqliteConnectionManager::file(db_path).with_init(configure_connection);
    let pool = Pool::builder().max_size(8).build(manager)?;

    // Journal mode is persistent on the file, once is enough
    let conn = pool.get()?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        ",
    )?;

    Ok(pool)
}

/// Single-connection in-memory pool. Every connection of an in-memory
/// manager is a separate database, so the pool must never grow.
pub fn create_memory_pool() -> anyhow::Result<DbPool> {
    let manager = SqliteConnectionManager::memory().with_init(configure_connection);
    let pool = Pool::builder().max_size(1).build(manager)?;
    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

/// True for a UNIQUE constraint failure, e.g. a duplicate email.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Fresh identifier for a new row.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::{params, Connection};

    use super::*;

    pub fn migrated_pool() -> DbPool {
        let pool = create_memory_pool().unwrap();
        run_migrations(&pool).unwrap();
        pool
    }

    pub fn insert_user(conn: &Connection, id: &str, username: &str, is_admin: bool) {
        conn.execute(
            "INSERT INTO users (id, email, username, password_hash, is_admin)
             VALUES (?1, ?2, ?3, 'x', ?4)",
            params![id, format!("{}@example.com", username), username, is_admin],
        )
        .unwrap();
    }

    pub fn insert_post(
        conn: &Connection,
        id: &str,
        author_id: &str,
        title: &str,
        created_at: &str,
    ) {
        conn.execute(
            "INSERT INTO posts (id, title, description, code_snippet, tags, author_id, created_at)
             VALUES (?1, ?2, 'desc', 'code', '[\"css\"]', ?3, ?4)",
            params![id, title, author_id, created_at],
        )
        .unwrap();
    }

    pub fn insert_comment(conn: &Connection, id: &str, post_id: &str, user_id: &str) {
        conn.execute(
            "INSERT INTO comments (id, content, post_id, user_id) VALUES (?1, 'nice', ?2, ?3)",
            params![id, post_id, user_id],
        )
        .unwrap();
    }

    pub fn insert_reaction(conn: &Connection, id: &str, post_id: &str, user_id: &str) {
        conn.execute(
            "INSERT INTO reactions (id, type, post_id, user_id) VALUES (?1, 'Like', ?2, ?3)",
            params![id, post_id, user_id],
        )
        .unwrap();
    }

    pub fn insert_favorite(
        conn: &Connection,
        id: &str,
        post_id: &str,
        user_id: &str,
        created_at: &str,
    ) {
        conn.execute(
            "INSERT INTO favorites (id, post_id, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, post_id, user_id, created_at],
        )
        .unwrap();
    }
}
