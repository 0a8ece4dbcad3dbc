//! SQLite connection implementation

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{OpenFlags, params_from_iter};
use simple_crud_core::{
    ColumnMeta, Connection, CoreError, QueryResult, Result, Row, StatementResult, Value,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

const IN_MEMORY: &str = ":memory:";

/// A single rusqlite connection shared behind a mutex.
///
/// Foreign keys are enabled on every connection, so deleting a referenced
/// row fails with [`CoreError::ForeignKeyViolation`].
pub struct SqliteConnection {
    conn: Mutex<rusqlite::Connection>,
    closed: AtomicBool,
}

impl SqliteConnection {
    /// Open a database file, or a private database for `:memory:`.
    ///
    /// The file is created if needed, its directory must already exist.
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == IN_MEMORY {
            rusqlite::Connection::open_in_memory().map_err(|e| {
                CoreError::Connection(format!("Failed to open in-memory database: {e}"))
            })?
        } else {
            let file = resolve_path(path)?;
            if let Some(dir) = file.parent()
                && !dir.as_os_str().is_empty()
                && !dir.exists()
            {
                return Err(CoreError::Connection(format!(
                    "Parent directory does not exist: {}",
                    dir.display()
                )));
            }
            let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX;
            let conn = rusqlite::Connection::open_with_flags(&file, flags).map_err(|e| {
                CoreError::Connection(format!(
                    "Failed to open SQLite database at '{}': {e}",
                    file.display()
                ))
            })?;
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| CoreError::Connection(format!("Failed to set journal mode: {e}")))?;
            conn
        };

        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| CoreError::Connection(format!("Failed to enable foreign keys: {e}")))?;

        tracing::info!(path, "SQLite database opened");
        Ok(Self {
            conn: Mutex::new(conn),
            closed: AtomicBool::new(false),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(IN_MEMORY)
    }

    /// Run a script of `;`-separated statements, e.g. a schema
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!(bytes = sql.len(), "executing SQL batch");
        self.conn
            .lock()
            .execute_batch(sql)
            .map_err(|e| map_sqlite_error(e, "Failed to execute batch"))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(CoreError::Connection("Connection is closed".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    fn driver_name(&self) -> &str {
        "sqlite"
    }

    #[tracing::instrument(skip_all, fields(sql = %sql))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.ensure_open()?;
        let conn = self.conn.lock();

        let affected = conn
            .execute(sql, params_from_iter(params.iter().map(to_sql_value)))
            .map_err(|e| map_sqlite_error(e, "Failed to execute statement"))?;

        // last_insert_rowid is per connection and stale after non-inserts
        let inserted = affected > 0 && starts_with_keyword(sql, "INSERT");
        let last_insert_id = inserted.then(|| conn.last_insert_rowid());

        tracing::debug!(affected, ?last_insert_id, "statement executed");
        Ok(StatementResult {
            affected_rows: affected as u64,
            last_insert_id,
        })
    }

    #[tracing::instrument(skip_all, fields(sql = %sql))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_open()?;
        let started = Instant::now();
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| map_sqlite_error(e, "Failed to prepare query"))?;

        let columns: Vec<ColumnMeta> = stmt
            .columns()
            .iter()
            .enumerate()
            .map(|(ordinal, column)| ColumnMeta {
                name: column.name().to_string(),
                data_type: column.decl_type().unwrap_or("DYNAMIC").to_string(),
                ordinal,
            })
            .collect();
        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();

        let rows = stmt
            .query_map(params_from_iter(params.iter().map(to_sql_value)), |row| {
                let values = (0..names.len())
                    .map(|i| row.get_ref(i).map(from_sql_value))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(Row::new(names.clone(), values))
            })
            .and_then(|mapped| mapped.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| map_sqlite_error(e, "Failed to execute query"))?;

        tracing::debug!(
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query executed"
        );
        Ok(QueryResult { columns, rows })
    }

    async fn close(&self) -> Result<()> {
        tracing::debug!("closing SQLite connection");
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Expand a leading `~/` to the home directory
fn resolve_path(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .ok_or_else(|| CoreError::Configuration("Unable to determine HOME directory".into())),
        None if path.starts_with('~') => Err(CoreError::Configuration(
            "User-specific home directories (~user) are not supported".into(),
        )),
        None => Ok(Path::new(path).to_path_buf()),
    }
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    sql.trim_start()
        .get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}

/// Translate a rusqlite error, keeping foreign key violations distinguishable
fn map_sqlite_error(error: rusqlite::Error, context: &str) -> CoreError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            CoreError::ForeignKeyViolation(error.to_string())
        }
        _ => CoreError::Query(format!("{context}: {error}")),
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int64(i) => SqlValue::Integer(*i),
        Value::Float64(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int64(i),
        ValueRef::Real(f) => Value::Float64(f),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}
