//! Table access facade
//!
//! Sorting, paging and parent scoping for one configured table. Identifiers
//! are quoted for the connection's driver and every value is bound as a
//! parameter.

use serde::{Deserialize, Serialize};
use simple_crud_core::{Connection, Row, Value};
use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use crate::sort::{SortDirection, SortSpec};
use crate::table_config::TableConfig;

pub const DEFAULT_PAGE_SIZE: usize = 100;

const MAX_SQL_INT: usize = i64::MAX as usize;

/// Submitted item fields. A missing or non-positive `id` means a new item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub id: Option<Value>,
    pub name: String,
}

impl ItemData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The id, if it names an existing row
    pub fn positive_id(&self) -> Option<i64> {
        self.id.as_ref().and_then(Value::as_positive_id)
    }
}

/// CRUD access to a single table
pub struct TableFacade {
    connection: Arc<dyn Connection>,
    config: TableConfig,
}

impl TableFacade {
    pub fn new(connection: Arc<dyn Connection>, config: TableConfig) -> Self {
        Self { connection, config }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// Resolve a requested sort against the columns the table allows.
    ///
    /// Only the id and value columns are sortable. Any other column falls
    /// back to the value column, ascending.
    pub fn resolve_sort(&self, column: Option<&str>, direction: &str) -> SortSpec {
        let value_column = self.config.value_column();
        match column {
            None => SortSpec::new(value_column, SortDirection::parse(direction)),
            Some(c) if c == value_column || c == self.config.id_column() => {
                SortSpec::new(c, SortDirection::parse(direction))
            }
            Some(c) => {
                tracing::debug!(requested = %c, fallback = %value_column, "unsortable column requested");
                SortSpec::ascending(value_column)
            }
        }
    }

    /// Select one page of items.
    ///
    /// `page_offset` is the zero-based page index. Nothing is queried until
    /// the returned selection is fetched or counted.
    #[tracing::instrument(skip(self), fields(table = %self.config.table_name()))]
    pub fn list_items(
        &self,
        sort_column: Option<&str>,
        sort_direction: &str,
        page_offset: usize,
        page_size: usize,
    ) -> ServiceResult<ItemSelection> {
        let driver = self.connection.driver_name();
        let sort = self.resolve_sort(sort_column, sort_direction);
        let table = escape_identifier_for(self.config.table_name(), driver);

        let (where_clause, params) = match self.config.scope()? {
            Some((parent, value)) => (
                format!(
                    " WHERE {} = {}",
                    escape_identifier_for(&parent.foreign_key_column, driver),
                    param_placeholder(driver, 1)
                ),
                vec![Value::Int64(value)],
            ),
            None => (String::new(), Vec::new()),
        };

        // SQL integers are signed 64 bit
        let limit = page_size.min(MAX_SQL_INT);
        let offset = page_offset.saturating_mul(page_size).min(MAX_SQL_INT);
        let data_sql = format!(
            "SELECT * FROM {}{} ORDER BY {} {} LIMIT {} OFFSET {}",
            table,
            where_clause,
            escape_identifier_for(&sort.column, driver),
            sort.direction.as_sql(),
            limit,
            offset
        );
        let count_sql = format!("SELECT COUNT(*) FROM {}{}", table, where_clause);

        tracing::debug!("Item selection SQL: {}", data_sql);

        Ok(ItemSelection {
            connection: self.connection.clone(),
            sort,
            data_sql,
            count_sql,
            params,
        })
    }

    /// [`list_items`](Self::list_items) with the value column ascending and
    /// the first page of [`DEFAULT_PAGE_SIZE`] items
    pub fn list_items_default(&self) -> ServiceResult<ItemSelection> {
        self.list_items(None, "ASC", 0, DEFAULT_PAGE_SIZE)
    }

    /// Load a row by id. Unknown ids are `Ok(None)`.
    #[tracing::instrument(skip(self), fields(table = %self.config.table_name()))]
    pub async fn get_item(&self, id: i64) -> ServiceResult<Option<Row>> {
        let driver = self.connection.driver_name();
        let sql = format!(
            "SELECT * FROM {} WHERE {} = {} LIMIT 1",
            escape_identifier_for(self.config.table_name(), driver),
            escape_identifier_for(self.config.id_column(), driver),
            param_placeholder(driver, 1)
        );

        let row = self
            .connection
            .query_one(&sql, &[Value::Int64(id)])
            .await
            .map_err(|e| {
                tracing::error!(error = %e, id, "failed to load item");
                ServiceError::from(e)
            })?;

        tracing::debug!(id, found = row.is_some(), "item lookup");
        Ok(row)
    }

    /// Rename an existing item, returning the number of affected rows
    #[tracing::instrument(skip(self, data), fields(table = %self.config.table_name()))]
    pub async fn update_item(&self, data: &ItemData) -> ServiceResult<u64> {
        let id = data
            .positive_id()
            .ok_or_else(|| ServiceError::InvalidArgument("invalid item id".to_string()))?;
        let driver = self.connection.driver_name();
        let sql = format!(
            "UPDATE {} SET {} = {} WHERE {} = {}",
            escape_identifier_for(self.config.table_name(), driver),
            escape_identifier_for(self.config.value_column(), driver),
            param_placeholder(driver, 1),
            escape_identifier_for(self.config.id_column(), driver),
            param_placeholder(driver, 2)
        );

        tracing::debug!("Update SQL: {}", sql);

        let result = self
            .connection
            .execute(&sql, &[Value::from(data.name.as_str()), Value::Int64(id)])
            .await
            .map_err(|e| {
                tracing::error!(error = %e, id, "failed to update item");
                ServiceError::from(e)
            })?;

        tracing::info!(id, affected_rows = result.affected_rows, "item updated");
        Ok(result.affected_rows)
    }

    /// Delete an item.
    ///
    /// Rows still referenced by a child table are kept and reported as
    /// [`ServiceError::ConstraintViolation`].
    #[tracing::instrument(skip(self), fields(table = %self.config.table_name()))]
    pub async fn delete_item(&self, id: i64) -> ServiceResult<u64> {
        if id <= 0 {
            return Err(ServiceError::InvalidArgument("invalid item id".to_string()));
        }
        let driver = self.connection.driver_name();
        let sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            escape_identifier_for(self.config.table_name(), driver),
            escape_identifier_for(self.config.id_column(), driver),
            param_placeholder(driver, 1)
        );

        tracing::debug!("Delete SQL: {}", sql);

        let result = match self.connection.execute(&sql, &[Value::Int64(id)]).await {
            Ok(result) => result,
            Err(e) if e.is_foreign_key_violation() => {
                tracing::warn!(id, error = %e, "item is still referenced");
                return Err(ServiceError::from(e));
            }
            Err(e) => {
                tracing::error!(id, error = %e, "failed to delete item");
                return Err(ServiceError::from(e));
            }
        };

        tracing::info!(id, deleted_count = result.affected_rows, "item deleted");
        Ok(result.affected_rows)
    }

    /// Insert a new item and return it as stored.
    ///
    /// Child tables attach the configured foreign key value, which must
    /// name an existing parent row.
    #[tracing::instrument(skip(self, data), fields(table = %self.config.table_name()))]
    pub async fn add_item(&self, data: &ItemData) -> ServiceResult<Option<Row>> {
        let driver = self.connection.driver_name();
        let mut columns = vec![escape_identifier_for(self.config.value_column(), driver)];
        let mut params = vec![Value::from(data.name.as_str())];

        if let Some((parent, value)) = self.config.scope()? {
            let parent_sql = format!(
                "SELECT * FROM {} WHERE {} = {} LIMIT 1",
                escape_identifier_for(&parent.table_name, driver),
                escape_identifier_for(&parent.id_column, driver),
                param_placeholder(driver, 1)
            );
            let parent_row = self
                .connection
                .query_one(&parent_sql, &[Value::Int64(value)])
                .await
                .map_err(ServiceError::from)?;
            if parent_row.is_none() {
                tracing::warn!(parent = %parent.table_name, value, "parent row not found");
                return Err(ServiceError::InvalidArgument("invalid foreign key".to_string()));
            }
            columns.push(escape_identifier_for(&parent.foreign_key_column, driver));
            params.push(Value::Int64(value));
        }

        let placeholders: Vec<String> = (1..=params.len())
            .map(|index| param_placeholder(driver, index))
            .collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            escape_identifier_for(self.config.table_name(), driver),
            columns.join(", "),
            placeholders.join(", ")
        );

        tracing::debug!("Insert SQL: {}", sql);

        let result = self.connection.execute(&sql, &params).await.map_err(|e| {
            tracing::error!(error = %e, "failed to insert item");
            ServiceError::from(e)
        })?;

        let Some(id) = result.last_insert_id else {
            tracing::warn!(affected_rows = result.affected_rows, "insert reported no row id");
            return Ok(None);
        };

        tracing::info!(id, "item inserted");
        self.get_item(id).await
    }
}

/// A lazily executed, countable page of items
pub struct ItemSelection {
    connection: Arc<dyn Connection>,
    sort: SortSpec,
    data_sql: String,
    count_sql: String,
    params: Vec<Value>,
}

impl std::fmt::Debug for ItemSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemSelection")
            .field("sort", &self.sort)
            .field("data_sql", &self.data_sql)
            .field("count_sql", &self.count_sql)
            .field("params", &self.params)
            .finish()
    }
}

impl ItemSelection {
    /// Sort applied after validation
    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn sql(&self) -> &str {
        &self.data_sql
    }

    /// Load the rows of the selected page
    pub async fn fetch(&self) -> ServiceResult<Vec<Row>> {
        let result = self
            .connection
            .query(&self.data_sql, &self.params)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to load item page");
                ServiceError::from(e)
            })?;
        Ok(result.rows)
    }

    /// Count all rows matching the filter, ignoring paging
    pub async fn count(&self) -> ServiceResult<u64> {
        let result = self
            .connection
            .query(&self.count_sql, &self.params)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to count items");
                ServiceError::from(e)
            })?;

        result
            .scalar_i64()
            .map(|count| count.max(0) as u64)
            .ok_or_else(|| {
                ServiceError::TableOperationFailed("COUNT(*) query returned no result".to_string())
            })
    }

    /// Run the page query and the count concurrently
    pub async fn fetch_with_count(&self) -> ServiceResult<(Vec<Row>, u64)> {
        let (rows, count) = tokio::join!(self.fetch(), self.count());
        let (rows, count) = (rows?, count?);
        tracing::debug!(rows = rows.len(), total = count, "item page loaded");
        Ok((rows, count))
    }
}

/// Escape SQL identifier (table/column name) using the appropriate
/// quoting style for the target database.
pub fn escape_identifier_for(identifier: &str, driver_name: &str) -> String {
    match driver_name {
        "mysql" => format!("`{}`", identifier.replace('`', "``")),
        "mssql" => format!("[{}]", identifier.replace(']', "]]")),
        _ => format!("\"{}\"", identifier.replace('"', "\"\"")),
    }
}

fn param_placeholder(driver_name: &str, param_index: usize) -> String {
    if driver_name == "postgresql" {
        format!("${}", param_index)
    } else {
        "?".to_string()
    }
}
