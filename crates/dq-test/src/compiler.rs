//! SQL compilation of test specifications
//!
//! Every compiled statement returns exactly one row with one integer column:
//! the number of violating rows, or for `unique` the number of duplicate
//! groups. The time window is ANDed as a separate top-level filter and never
//! folded into the violation predicate.

use crate::error::{CompileError, CompileResult};
use crate::expr::Expr;
use crate::spec::{TestKind, TestSpec, TimeWindow, WindowMode};
use dq_core::Dialect;

/// Compile a specification into a scalar count query for `dialect`
pub fn compile(spec: &TestSpec, dialect: Dialect) -> CompileResult<String> {
    let table = spec.table.to_sql()?;
    let window = window_predicate(&spec.time_window)
        .map(|w| w.render(dialect))
        .transpose()?;

    match spec.kind {
        TestKind::NotNull => {
            let column = target_column(spec)?;
            let predicate = Expr::col(column).is_null().render(dialect)?;
            Ok(count_rows(&table, &predicate, window.as_deref()))
        }
        TestKind::CustomCondition => {
            let condition =
                spec.condition
                    .as_ref()
                    .ok_or_else(|| CompileError::MissingCondition {
                        rule: spec.rule.clone(),
                    })?;
            let predicate = condition.render(dialect)?;
            Ok(count_rows(&table, &predicate, window.as_deref()))
        }
        TestKind::Unique => {
            let column = Expr::col(target_column(spec)?).render(dialect)?;
            let mut filter = format!("{column} IS NOT NULL");
            if let Some(window) = window {
                filter.push_str(&format!(" AND ({window})"));
            }
            Ok(format!(
                "SELECT COUNT(*) FROM (SELECT {column} FROM {table} WHERE {filter} \
                 GROUP BY {column} HAVING COUNT(*) > 1) AS dup_groups"
            ))
        }
    }
}

/// Row filter for a time window, or `None` when the window is inactive
pub fn window_predicate(window: &TimeWindow) -> Option<Expr> {
    let column = window.column.as_ref()?;
    match window.mode {
        WindowMode::None => None,
        WindowMode::TrailingDays(days) => Some(Expr::col(column).at_least(Expr::days_ago(days))),
        WindowMode::PreviousCalendarDay => Some(Expr::and(vec![
            Expr::col(column).at_least(Expr::days_ago(1)),
            Expr::col(column).less_than(Expr::current_date()),
        ])),
    }
}

fn target_column(spec: &TestSpec) -> CompileResult<&str> {
    spec.target_columns
        .first()
        .map(String::as_str)
        .ok_or_else(|| CompileError::MissingTargetColumn {
            kind: spec.kind.to_string(),
            rule: spec.rule.clone(),
        })
}

fn count_rows(table: &str, predicate: &str, window: Option<&str>) -> String {
    match window {
        Some(window) => format!("SELECT COUNT(*) FROM {table} WHERE ({predicate}) AND ({window})"),
        None => format!("SELECT COUNT(*) FROM {table} WHERE ({predicate})"),
    }
}

#[cfg(test)]
#[path = "compiler_test.rs"]
mod tests;
