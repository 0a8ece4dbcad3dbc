//! Database bootstrap

use anyhow::{Context, Result};
use simple_crud_core::ConnectionConfig;
use simple_crud_driver_sqlite::{SqliteConnection, SqliteDriver};
use std::sync::Arc;

pub const SCHEMA: &str = include_str!("sql/schema.sql");

/// Open the SQLite database at `path` and make sure the schema exists
pub async fn open(path: &str) -> Result<Arc<SqliteConnection>> {
    if path != ":memory:"
        && let Some(parent) = std::path::Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let config = ConnectionConfig::new_sqlite(path);
    let conn = SqliteDriver::new()
        .open(&config)
        .with_context(|| format!("Failed to open database {path}"))?;
    conn.execute_batch(SCHEMA)
        .await
        .context("Failed to create schema")?;

    tracing::info!(path, "database ready");
    Ok(Arc::new(conn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_crud_core::Connection;

    #[tokio::test]
    async fn schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("lists.db");
        let path = path.to_string_lossy().to_string();

        let conn = open(&path).await.unwrap();
        conn.execute("INSERT INTO list (name) VALUES ('kept')", &[])
            .await
            .unwrap();
        drop(conn);

        let conn = open(&path).await.unwrap();
        let count = conn
            .query("SELECT COUNT(*) FROM list", &[])
            .await
            .unwrap()
            .scalar_i64();
        assert_eq!(count, Some(1));
    }
}
