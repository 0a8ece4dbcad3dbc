//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use indoc::indoc;
use simple_crud_core::{
    ColumnMeta, Connection, CoreError, QueryResult, Result, Row, StatementResult, Value,
};
use simple_crud_driver_sqlite::SqliteConnection;
use simple_crud_services::{TableConfig, TableFacade};
use std::sync::Arc;

/// Mock connection for testing SQL generation without a real database.
///
/// Query responses are matched by SQL substring. Every statement is logged
/// together with its bound parameters.
pub struct MockConnection {
    pub driver: String,
    pub should_fail: bool,
    /// Default query result returned when no pattern matches
    pub query_results: Vec<QueryResult>,
    /// SQL-pattern-based responses: if a query contains the pattern string,
    /// the corresponding result is returned instead of the default.
    pub query_responses: Vec<(String, QueryResult)>,
    pub execute_result: StatementResult,
    /// Log of all SQL executed, for assertion in tests
    pub query_log: Arc<parking_lot::Mutex<Vec<(String, Vec<Value>)>>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            driver: "sqlite".to_string(),
            should_fail: false,
            query_results: vec![],
            query_responses: vec![],
            execute_result: StatementResult {
                affected_rows: 1,
                last_insert_id: None,
            },
            query_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn with_result(mut self, result: QueryResult) -> Self {
        self.query_results.push(result);
        self
    }

    /// Register a response for queries containing the given SQL pattern.
    pub fn with_query_response(
        mut self,
        sql_contains: impl Into<String>,
        result: QueryResult,
    ) -> Self {
        self.query_responses.push((sql_contains.into(), result));
        self
    }

    pub fn with_execute_result(mut self, affected_rows: u64, last_insert_id: Option<i64>) -> Self {
        self.execute_result = StatementResult {
            affected_rows,
            last_insert_id,
        };
        self
    }

    pub fn query_log(&self) -> Vec<String> {
        self.query_log.lock().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn logged_params(&self) -> Vec<Vec<Value>> {
        self.query_log
            .lock()
            .iter()
            .map(|(_, params)| params.clone())
            .collect()
    }

    fn log(&self, sql: &str, params: &[Value]) {
        self.query_log.lock().push((sql.to_string(), params.to_vec()));
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.log(sql, params);
        if self.should_fail {
            Err(CoreError::Query("Execute failed".into()))
        } else {
            Ok(self.execute_result.clone())
        }
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.log(sql, params);

        if self.should_fail {
            return Err(CoreError::Query("Query failed".into()));
        }

        for (pattern, result) in &self.query_responses {
            if sql.contains(pattern.as_str()) {
                return Ok(result.clone());
            }
        }

        if let Some(result) = self.query_results.first() {
            Ok(result.clone())
        } else {
            Ok(QueryResult::empty())
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.should_fail
    }
}

/// Helper to create a mock query result with column names and row data
pub fn mock_query_result(column_names: Vec<&str>, row_data: Vec<Vec<Value>>) -> QueryResult {
    let columns: Vec<ColumnMeta> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnMeta {
            name: name.to_string(),
            data_type: "TEXT".to_string(),
            ordinal: i,
        })
        .collect();
    let names: Vec<String> = column_names.iter().map(|c| c.to_string()).collect();
    let rows = row_data
        .into_iter()
        .map(|values| Row::new(names.clone(), values))
        .collect();

    QueryResult { columns, rows }
}

pub fn count_result(count: i64) -> QueryResult {
    mock_query_result(vec!["COUNT(*)"], vec![vec![Value::Int64(count)]])
}

pub const SCHEMA: &str = indoc! {"
    CREATE TABLE list (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    );
    CREATE TABLE item (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        list_id INTEGER NOT NULL REFERENCES list(id)
    );
"};

/// Fresh in-memory database with the list/item schema
pub async fn sqlite_fixture() -> Arc<SqliteConnection> {
    let conn = SqliteConnection::open_in_memory().expect("open in-memory database");
    conn.execute_batch(SCHEMA).await.expect("create schema");
    Arc::new(conn)
}

/// Insert a list row and `items` child rows named `{list}-{n}`, returning the list id
pub async fn seed_list(conn: &Arc<SqliteConnection>, name: &str, items: usize) -> i64 {
    let list_id = conn
        .execute("INSERT INTO list (name) VALUES (?)", &[Value::from(name)])
        .await
        .expect("insert list")
        .last_insert_id
        .expect("list id");
    for n in 1..=items {
        conn.execute(
            "INSERT INTO item (name, list_id) VALUES (?, ?)",
            &[Value::from(format!("{name}-{n:02}")), Value::Int64(list_id)],
        )
        .await
        .expect("insert item");
    }
    list_id
}

pub fn list_facade(conn: &Arc<SqliteConnection>) -> TableFacade {
    let config = TableConfig::builder("list").build().expect("list config");
    TableFacade::new(conn.clone() as Arc<dyn Connection>, config)
}

pub fn item_facade(conn: &Arc<SqliteConnection>, list_id: Option<i64>) -> TableFacade {
    let config = TableConfig::builder("item")
        .parent("list", "list_id")
        .foreign_key_value(list_id)
        .build()
        .expect("item config");
    TableFacade::new(conn.clone() as Arc<dyn Connection>, config)
}

pub fn names(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            row.get_by_name("name")
                .map(|v| v.to_string())
                .unwrap_or_default()
        })
        .collect()
}
