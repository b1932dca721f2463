pub mod repository;
pub mod sqlite;

use sqlx::SqlitePool;

use crate::error::Result;

const SCHEMA_SQL: &str = include_str!("../../../../migrations/sqlite/001_initial_schema.sql");

pub enum DatabasePool {
    Sqlite(SqlitePool),
}

impl DatabasePool {
    /// Open (or create) a SQLite database at the given path and apply the schema.
    pub async fn new_sqlite(path: &str) -> Result<Self> {
        let pool = SqlitePool::connect(path).await?;
        apply_schema(&pool).await?;
        Ok(DatabasePool::Sqlite(pool))
    }

    /// Open an in-memory SQLite database with the schema applied. Used by tests.
    pub async fn new_sqlite_memory() -> Result<Self> {
        let pool = SqlitePool::connect(":memory:").await?;
        apply_schema(&pool).await?;
        Ok(DatabasePool::Sqlite(pool))
    }
}

/// Apply the schema statement by statement so reruns against an existing
/// database file are harmless.
async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON;").execute(pool).await?;

    for statement in SCHEMA_SQL.split(';') {
        let statement = statement.trim();
        if statement.is_empty() || statement.starts_with("PRAGMA") {
            continue;
        }
        if let Err(e) = sqlx::query(statement).execute(pool).await {
            let msg = e.to_string();
            if msg.contains("duplicate column") || msg.contains("already exists") {
                continue;
            }
            return Err(e.into());
        }
    }
    Ok(())
}
