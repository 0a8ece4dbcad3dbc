//! Connection trait

use crate::{QueryResult, Result, Row, StatementResult, Value};
use async_trait::async_trait;

/// A database connection
///
/// Implementations must report foreign key violations as
/// [`CoreError::ForeignKeyViolation`](crate::CoreError::ForeignKeyViolation)
/// rather than a generic query error.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "sqlite", "postgresql", "mysql")
    fn driver_name(&self) -> &str;

    /// Execute a statement that modifies data (INSERT/UPDATE/DELETE)
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows (SELECT)
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Execute a query and keep only its first row
    async fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        let result = self.query(sql, params).await?;
        tracing::trace!(rows = result.row_count(), "query_one fetched");
        Ok(result.into_first_row())
    }

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}
