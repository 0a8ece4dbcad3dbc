//! SQLite driver

use async_trait::async_trait;
use simple_crud_core::{Connection, ConnectionConfig, CoreError, DatabaseDriver, Result};
use std::sync::Arc;

use crate::SqliteConnection;

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        Self
    }

    /// Open a connection, keeping the concrete type.
    ///
    /// Callers that need [`SqliteConnection::execute_batch`] (schema
    /// bootstrap) use this instead of [`DatabaseDriver::connect`].
    pub fn open(&self, config: &ConnectionConfig) -> Result<SqliteConnection> {
        let path = config.get_string("path").ok_or_else(|| {
            CoreError::Configuration(
                "SQLite needs a database path, e.g. { \"database\": \"/path/to/lists.db\" }".into(),
            )
        })?;

        SqliteConnection::open(&path).inspect_err(|e| {
            tracing::error!(path = %path, error = %e, "failed to open SQLite database");
        })
    }
}

#[async_trait]
impl DatabaseDriver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[tracing::instrument(skip_all, fields(path = config.get_string("path").as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        Ok(Arc::new(self.open(config)?))
    }
}
