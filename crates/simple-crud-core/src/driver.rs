//! Driver trait and connection settings

use crate::{Connection, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Opens connections for one database engine
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Identifier matching [`Connection::driver_name`]
    fn name(&self) -> &'static str;

    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Connect and run `SELECT 1`
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        let conn = self.connect(config).await?;
        conn.query("SELECT 1", &[]).await?;
        Ok(())
    }
}

/// Where and how to connect.
///
/// `database` is the file path for SQLite. Driver specific settings go in
/// `params`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub driver: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(driver: &str) -> Self {
        Self {
            driver: driver.to_string(),
            ..Self::default()
        }
    }

    pub fn new_sqlite(database_path: &str) -> Self {
        Self {
            database: Some(database_path.to_string()),
            ..Self::new("sqlite")
        }
    }

    /// A parameter by name. `path` and `database` fall back to the `database` field.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned().or_else(|| match key {
            "database" | "path" => self.database.clone(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_path_is_readable_under_both_names() {
        let config = ConnectionConfig::new_sqlite("/tmp/lists.db");
        assert_eq!(config.driver, "sqlite");
        assert_eq!(config.get_string("path").as_deref(), Some("/tmp/lists.db"));
        assert_eq!(config.get_string("database").as_deref(), Some("/tmp/lists.db"));
        assert_eq!(config.get_string("user"), None);
    }

    #[test]
    fn explicit_param_wins() {
        let mut config = ConnectionConfig::new_sqlite("/tmp/a.db");
        config.params.insert("path".into(), "/tmp/b.db".into());
        assert_eq!(config.get_string("path").as_deref(), Some("/tmp/b.db"));
    }
}
