//! Warehouse trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use dq_core::{ColumnDescriptor, Dialect, QualifiedName};
use std::time::Duration;

/// Warehouse collaborator the rule engine runs against
///
/// Implementations must be Send + Sync for async operation. Every method is
/// read-only; test execution never mutates warehouse state.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Describe a table's columns in declared order.
    ///
    /// Fails with [`DbError::TableNotFound`](crate::DbError::TableNotFound)
    /// when the table is absent or inaccessible.
    async fn describe_table(&self, table: &QualifiedName) -> DbResult<Vec<ColumnDescriptor>>;

    /// Run a query returning a single integer, bounded by `timeout`.
    ///
    /// Exceeding the budget yields [`DbError::Timeout`](crate::DbError::Timeout);
    /// the server-side statement is not cancelled.
    async fn execute_scalar_query(&self, sql: &str, timeout: Duration) -> DbResult<i64>;

    /// List base table names in a schema, sorted by name
    async fn list_tables(&self, database: &str, schema: &str) -> DbResult<Vec<String>>;

    /// SQL dialect queries for this warehouse must be rendered in
    fn dialect(&self) -> Dialect;

    /// Warehouse type identifier for logging
    fn db_type(&self) -> &'static str;
}
