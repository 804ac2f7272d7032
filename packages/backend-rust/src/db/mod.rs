pub mod operations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::schema::{split_sql_statements, SCHEMA_SQL, SCHEMA_VERSION};

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("failed to create database directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid database url: {0}")]
    Config(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Open (creating if missing) the SQLite database and apply the schema once.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, DbInitError> {
    if let Some(parent) = database_file(database_url).as_deref().and_then(Path::parent) {
        ensure_dir(parent)?;
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| DbInitError::Config(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

pub async fn schema_version(pool: &SqlitePool) -> Result<Option<String>, sqlx::Error> {
    let version = sqlx::query_scalar::<_, String>(
        r#"SELECT "value" FROM "_db_metadata" WHERE "key" = 'schema_version'"#,
    )
    .fetch_optional(pool)
    .await;

    match version {
        Ok(version) => Ok(version),
        // Fresh database: metadata table not created yet.
        Err(sqlx::Error::Database(err)) if err.message().contains("no such table") => Ok(None),
        Err(err) => Err(err),
    }
}

pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), DbInitError> {
    if schema_version(pool).await?.is_some() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for statement in split_sql_statements(SCHEMA_SQL) {
        sqlx::query(&statement).execute(&mut *tx).await?;
    }
    sqlx::query(
        r#"INSERT OR REPLACE INTO "_db_metadata" ("key", "value") VALUES ('schema_version', ?)"#,
    )
    .bind(SCHEMA_VERSION)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(version = SCHEMA_VERSION, "database schema applied");
    Ok(())
}

/// File path named by a `sqlite:` url, `None` for in-memory databases.
fn database_file(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

fn ensure_dir(dir: &Path) -> Result<(), DbInitError> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|source| DbInitError::Io {
        path: dir.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sqlite_url;

    #[tokio::test]
    async fn test_init_pool_applies_schema_once() {
        let dir = tempfile::tempdir().unwrap();
        let url = sqlite_url(&dir.path().join("nested").join("test.db"));

        let pool = init_pool(&url).await.unwrap();
        assert_eq!(
            schema_version(&pool).await.unwrap().as_deref(),
            Some(SCHEMA_VERSION)
        );
        ping(&pool).await.unwrap();
        pool.close().await;

        let reopened = init_pool(&url).await.unwrap();
        assert!(dir.path().join("nested").join("test.db").exists());
        assert_eq!(
            schema_version(&reopened).await.unwrap().as_deref(),
            Some(SCHEMA_VERSION)
        );
    }

    #[test]
    fn test_database_file_from_url() {
        assert_eq!(
            database_file("sqlite:/tmp/a/b.db?mode=rwc"),
            Some(PathBuf::from("/tmp/a/b.db"))
        );
        assert_eq!(database_file("sqlite://data.db"), Some(PathBuf::from("data.db")));
        assert_eq!(database_file("sqlite::memory:"), None);
    }
}
