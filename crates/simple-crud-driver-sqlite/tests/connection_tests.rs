//! SQLite connection tests against in-memory and on-disk databases.

use indoc::indoc;
use simple_crud_core::{Connection, ConnectionConfig, CoreError, DatabaseDriver, Value};
use simple_crud_driver_sqlite::{SqliteConnection, SqliteDriver};

const SCHEMA: &str = indoc! {"
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

async fn connection_with_schema() -> SqliteConnection {
    let conn = SqliteConnection::open_in_memory().expect("open in-memory db");
    conn.execute_batch(SCHEMA).await.expect("create schema");
    conn
}

#[tokio::test]
async fn insert_reports_last_insert_id() {
    let conn = connection_with_schema().await;

    let first = conn
        .execute("INSERT INTO list (name) VALUES (?)", &[Value::from("groceries")])
        .await
        .unwrap();
    let second = conn
        .execute("INSERT INTO list (name) VALUES (?)", &[Value::from("chores")])
        .await
        .unwrap();

    assert_eq!(first.affected_rows, 1);
    assert_eq!(first.last_insert_id, Some(1));
    assert_eq!(second.last_insert_id, Some(2));
}

#[tokio::test]
async fn update_does_not_report_insert_id() {
    let conn = connection_with_schema().await;
    conn.execute("INSERT INTO list (name) VALUES ('a')", &[]).await.unwrap();

    let result = conn
        .execute("UPDATE list SET name = ? WHERE id = ?", &[Value::from("b"), Value::Int64(1)])
        .await
        .unwrap();

    assert_eq!(result.affected_rows, 1);
    assert_eq!(result.last_insert_id, None);
}

#[tokio::test]
async fn referenced_row_delete_is_a_foreign_key_violation() {
    let conn = connection_with_schema().await;
    conn.execute("INSERT INTO list (name) VALUES ('groceries')", &[]).await.unwrap();
    conn.execute("INSERT INTO item (name, list_id) VALUES ('milk', 1)", &[]).await.unwrap();

    let err = conn
        .execute("DELETE FROM list WHERE id = ?", &[Value::Int64(1)])
        .await
        .expect_err("delete must be blocked");

    assert!(err.is_foreign_key_violation(), "unexpected error: {err:?}");

    let remaining = conn.query("SELECT COUNT(*) FROM list", &[]).await.unwrap();
    assert_eq!(remaining.scalar_i64(), Some(1));
}

#[tokio::test]
async fn other_constraint_failures_are_plain_query_errors() {
    let conn = connection_with_schema().await;

    let err = conn
        .execute("INSERT INTO list (name) VALUES (NULL)", &[])
        .await
        .expect_err("NOT NULL must be enforced");

    assert!(matches!(err, CoreError::Query(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn query_returns_named_columns() {
    let conn = connection_with_schema().await;
    conn.execute("INSERT INTO list (name) VALUES ('groceries')", &[]).await.unwrap();

    let row = conn
        .query_one("SELECT * FROM list WHERE id = ?", &[Value::Int64(1)])
        .await
        .unwrap()
        .expect("row exists");

    assert_eq!(row.get_by_name("id"), Some(&Value::Int64(1)));
    assert_eq!(row.get_by_name("name"), Some(&Value::from("groceries")));

    let missing = conn
        .query_one("SELECT * FROM list WHERE id = ?", &[Value::Int64(99)])
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn closed_connection_rejects_statements() {
    let conn = connection_with_schema().await;
    conn.close().await.unwrap();

    assert!(conn.is_closed());
    let err = conn.query("SELECT 1", &[]).await.expect_err("closed");
    assert!(matches!(err, CoreError::Connection(_)));
}

#[tokio::test]
async fn driver_opens_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crud.db");
    let config = ConnectionConfig::new_sqlite(&path.to_string_lossy());

    let driver = SqliteDriver::new();
    driver.test_connection(&config).await.expect("connection works");

    assert!(path.exists());
    assert_eq!(driver.name(), "sqlite");
}

#[tokio::test]
async fn driver_requires_a_path() {
    let driver = SqliteDriver::new();
    let err = match driver.connect(&ConnectionConfig::new("sqlite")).await {
        Ok(_) => panic!("connect without a path must fail"),
        Err(e) => e,
    };
    assert!(matches!(err, CoreError::Configuration(_)));
}

#[tokio::test]
async fn missing_parent_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("crud.db");

    let err = match SqliteConnection::open(&path.to_string_lossy()) {
        Ok(_) => panic!("open must fail"),
        Err(e) => e,
    };
    assert!(matches!(err, CoreError::Connection(_)));
}
