//! Active table discovery
//!
//! Lists the tables in each configured schema, picks a time column for each
//! and keeps only tables that received rows recently.

use crate::error::CompileResult;
use crate::expr::Expr;
use dq_core::{ColumnDescriptor, Dialect, QualifiedName, SchemaScope};
use dq_db::Warehouse;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// A table worth testing, with the column its time window filters on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTable {
    pub table: QualifiedName,
    pub time_column: Option<String>,
}

/// Why discovery left a table out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Table could not be described
    DescribeFailed(String),
    /// No DATE or TIMESTAMP column to probe activity with
    NoTimeColumn,
    /// No rows inside the activity window
    Stale,
    /// Activity probe failed or timed out
    ActivityCheckFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DescribeFailed(e) => write!(f, "describe failed: {e}"),
            SkipReason::NoTimeColumn => f.write_str("no date/timestamp column"),
            SkipReason::Stale => f.write_str("no recent rows"),
            SkipReason::ActivityCheckFailed(e) => write!(f, "activity check failed: {e}"),
        }
    }
}

/// A table discovery left out, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTable {
    pub table: QualifiedName,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Tables found by [`discover_active_tables`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub active: Vec<ActiveTable>,
    pub skipped: Vec<SkippedTable>,
}

/// Discovery settings
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// A table is active if it has rows this many days back or newer
    pub activity_days: u32,

    /// Budget for each activity probe
    pub probe_timeout: Duration,

    /// Preferred time column names, most preferred first
    pub time_column_priority: Vec<String>,

    /// Tables included without an activity probe
    pub always_include: Vec<QualifiedName>,
}

/// Choose the column a table's time window filters on
///
/// The first name from `priority` that exists with a DATE/TIMESTAMP type
/// wins; otherwise the first DATE/TIMESTAMP column in table order.
pub fn pick_time_column(columns: &[ColumnDescriptor], priority: &[String]) -> Option<String> {
    priority
        .iter()
        .find_map(|wanted| {
            columns
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(wanted) && c.is_temporal())
        })
        .or_else(|| columns.iter().find(|c| c.is_temporal()))
        .map(|c| c.name.clone())
}

/// Query counting rows newer than `activity_days` ago
pub fn activity_probe_sql(
    table: &QualifiedName,
    time_column: &str,
    activity_days: u32,
    dialect: Dialect,
) -> CompileResult<String> {
    let predicate = Expr::col(time_column)
        .at_least(Expr::days_ago(activity_days))
        .render(dialect)?;
    Ok(format!(
        "SELECT COUNT(*) FROM {} WHERE {predicate}",
        table.to_sql()?
    ))
}

/// Describe a table and pick its time column
pub async fn resolve_table(
    warehouse: &dyn Warehouse,
    table: &QualifiedName,
    priority: &[String],
) -> Result<ActiveTable, SkipReason> {
    let columns = warehouse
        .describe_table(table)
        .await
        .map_err(|e| SkipReason::DescribeFailed(e.to_string()))?;
    Ok(ActiveTable {
        table: table.clone(),
        time_column: pick_time_column(&columns, priority),
    })
}

async fn check_table(
    warehouse: &dyn Warehouse,
    table: &QualifiedName,
    options: &DiscoveryOptions,
) -> Result<ActiveTable, SkipReason> {
    let resolved = resolve_table(warehouse, table, &options.time_column_priority).await?;
    let Some(time_column) = &resolved.time_column else {
        return Err(SkipReason::NoTimeColumn);
    };

    let sql = activity_probe_sql(
        table,
        time_column,
        options.activity_days,
        warehouse.dialect(),
    )
    .map_err(|e| SkipReason::ActivityCheckFailed(e.to_string()))?;
    let recent_rows = warehouse
        .execute_scalar_query(&sql, options.probe_timeout)
        .await
        .map_err(|e| SkipReason::ActivityCheckFailed(e.to_string()))?;

    if recent_rows > 0 {
        log::debug!("{table} is active ({recent_rows} recent rows on {time_column})");
        Ok(resolved)
    } else {
        Err(SkipReason::Stale)
    }
}

/// Find the tables in `scopes` that received rows recently
///
/// A scope that cannot be listed is logged and skipped. Tables in
/// `always_include` are added without an activity probe.
pub async fn discover_active_tables(
    warehouse: &dyn Warehouse,
    scopes: &[SchemaScope],
    options: &DiscoveryOptions,
) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    for scope in scopes {
        let names = match warehouse.list_tables(&scope.database, &scope.schema).await {
            Ok(names) => names,
            Err(e) => {
                log::warn!("Could not list tables in {scope}: {e}");
                continue;
            }
        };
        log::info!("Checking {} tables in {scope}", names.len());

        for name in names {
            let table = QualifiedName::new(&scope.database, &scope.schema, name);
            if options.always_include.contains(&table) {
                continue;
            }
            match check_table(warehouse, &table, options).await {
                Ok(active) => report.active.push(active),
                Err(reason) => {
                    log::debug!("Skipping {table}: {reason}");
                    report.skipped.push(SkippedTable { table, reason });
                }
            }
        }
    }

    for table in &options.always_include {
        match resolve_table(warehouse, table, &options.time_column_priority).await {
            Ok(active) => report.active.push(active),
            Err(reason) => {
                log::warn!("Skipping always-included table {table}: {reason}");
                report.skipped.push(SkippedTable {
                    table: table.clone(),
                    reason,
                });
            }
        }
    }

    log::info!(
        "Discovery found {} active tables ({} skipped)",
        report.active.len(),
        report.skipped.len()
    );
    report
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
