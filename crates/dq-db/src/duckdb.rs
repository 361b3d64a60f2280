//! DuckDB warehouse backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Warehouse;
use async_trait::async_trait;
use dq_core::{ColumnDescriptor, Dialect, QualifiedName};
use duckdb::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// DuckDB warehouse backend
///
/// The connection is shared behind a mutex for metadata lookups. Each scalar
/// query runs on its own cloned session on the blocking thread pool, so a
/// query that outlives its budget is interrupted without holding the lock.
pub struct DuckDbBackend {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Execute multiple SQL statements (fixtures and setup only)
    pub async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Name of the attached catalog (`memory` for in-memory databases)
    pub fn current_database(&self) -> DbResult<String> {
        let conn = lock(&self.conn)?;
        conn.query_row("SELECT current_database()", [], |row| row.get(0))
            .map_err(DbError::from)
    }

    fn describe_table_sync(&self, table: &QualifiedName) -> DbResult<Vec<ColumnDescriptor>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_catalog = ? AND table_schema = ? AND table_name = ? \
             ORDER BY ordinal_position",
        )?;
        let rows = stmt.query_map(
            params![table.database, table.schema, table.table],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )?;

        let mut columns = Vec::new();
        for row in rows {
            let (name, data_type) = row?;
            columns.push(ColumnDescriptor::new(name, warehouse_type_name(&data_type)));
        }

        if columns.is_empty() {
            return Err(DbError::TableNotFound(table.to_string()));
        }
        Ok(columns)
    }

    fn list_tables_sync(&self, database: &str, schema: &str) -> DbResult<Vec<String>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_catalog = ? AND table_schema = ? AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )?;
        let rows = stmt.query_map(params![database, schema], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn lock(conn: &Mutex<Connection>) -> DbResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| DbError::MutexPoisoned(e.to_string()))
}

fn scalar_query_blocking(conn: Connection, sql: &str) -> DbResult<i64> {
    let value: Option<i64> = conn.query_row(sql, [], |row| row.get(0))?;
    value.ok_or_else(|| DbError::ExecutionError(format!("scalar query returned NULL: {sql}")))
}

/// Map a DuckDB `data_type` to the warehouse-style type names the
/// classifier matches on (`NUMBER(p,s)`, `FLOAT`, `VARIANT`, ...).
pub fn warehouse_type_name(duckdb_type: &str) -> String {
    let ty = duckdb_type.trim().to_uppercase();
    match ty.as_str() {
        "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "HUGEINT" | "UTINYINT" | "USMALLINT"
        | "UINTEGER" | "UBIGINT" | "UHUGEINT" => "NUMBER(38,0)".to_string(),
        "FLOAT" | "REAL" | "DOUBLE" => "FLOAT".to_string(),
        "JSON" => "VARIANT".to_string(),
        "TIMESTAMP WITH TIME ZONE" => "TIMESTAMP_TZ".to_string(),
        "TIMESTAMP" | "TIMESTAMP_S" | "TIMESTAMP_MS" | "TIMESTAMP_NS" => {
            "TIMESTAMP_NTZ".to_string()
        }
        _ => match ty.strip_prefix("DECIMAL") {
            Some(precision) => format!("NUMBER{}", precision.replace(' ', "")),
            None => ty,
        },
    }
}

#[async_trait]
impl Warehouse for DuckDbBackend {
    async fn describe_table(&self, table: &QualifiedName) -> DbResult<Vec<ColumnDescriptor>> {
        self.describe_table_sync(table)
    }

    async fn execute_scalar_query(&self, sql: &str, timeout: Duration) -> DbResult<i64> {
        let session = lock(&self.conn)?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        let interrupt = session.interrupt_handle();
        let sql = sql.to_string();
        let task = tokio::task::spawn_blocking(move || scalar_query_blocking(session, &sql));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(DbError::Internal(join_err.to_string())),
            Err(_) => {
                interrupt.interrupt();
                log::debug!("DuckDB query interrupted after {:?}", timeout);
                Err(DbError::Timeout(timeout))
            }
        }
    }

    async fn list_tables(&self, database: &str, schema: &str) -> DbResult<Vec<String>> {
        self.list_tables_sync(database, schema)
    }

    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
