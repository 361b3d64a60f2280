//! Test execution

use crate::compiler::compile;
use crate::result::{TestOutcome, TestResult};
use crate::spec::TestSpec;
use dq_db::{DbError, Warehouse};
use std::time::Duration;

/// Runs compiled specifications against a warehouse, one at a time
pub struct TestExecutor<'a> {
    warehouse: &'a dyn Warehouse,
    timeout: Duration,
}

impl<'a> TestExecutor<'a> {
    /// Create an executor with a per-test timeout
    pub fn new(warehouse: &'a dyn Warehouse, timeout: Duration) -> Self {
        Self { warehouse, timeout }
    }

    /// Execute one compiled statement and classify the outcome
    pub async fn execute(&self, sql: &str) -> TestOutcome {
        match self.warehouse.execute_scalar_query(sql, self.timeout).await {
            Ok(count) => TestOutcome::from_count(count),
            Err(DbError::Timeout(_)) => TestOutcome::TimedOut,
            Err(e) => TestOutcome::Errored(e.to_string()),
        }
    }

    /// Compile and execute a specification
    pub async fn run_spec(&self, spec: &TestSpec) -> TestResult {
        let outcome = match compile(spec, self.warehouse.dialect()) {
            Ok(sql) => {
                log::debug!("SQL for {}: {}", spec.rule, sql);
                self.execute(&sql).await
            }
            Err(e) => TestOutcome::Errored(e.to_string()),
        };

        match &outcome {
            TestOutcome::Passed => log::debug!("  PASS {}", spec.rule),
            TestOutcome::Failed(count) => {
                log::info!("  FAIL {} ({count} violations)", spec.rule)
            }
            TestOutcome::TimedOut => log::warn!(
                "  TIMEOUT {} on {} after {}s",
                spec.rule,
                spec.table,
                self.timeout.as_secs_f64()
            ),
            TestOutcome::Errored(reason) => {
                log::error!("  ERROR {} on {}: {reason}", spec.rule, spec.table)
            }
        }

        TestResult::new(spec, &outcome)
    }

    /// Run specifications in order, logging progress as `(i/N)`
    pub async fn run_all(&self, specs: &[TestSpec]) -> Vec<TestResult> {
        let total = specs.len();
        let mut results = Vec::with_capacity(total);
        for (i, spec) in specs.iter().enumerate() {
            log::info!(
                "({}/{}) Running '{}' on {}.{}",
                i + 1,
                total,
                spec.kind,
                spec.table,
                spec.columns_label()
            );
            results.push(self.run_spec(spec).await);
        }
        results
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
