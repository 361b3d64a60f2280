//! Run orchestration
//!
//! Describes each table, synthesizes its specifications and executes them
//! in order. A table that cannot be described is dropped from the run; a
//! test that fails to compile or execute becomes an `error` or `timeout`
//! result. Nothing short of that aborts the run.

use crate::discovery::{ActiveTable, SkipReason, SkippedTable};
use crate::executor::TestExecutor;
use crate::result::{RunSummary, TestResult};
use crate::spec::TestSpec;
use crate::synthesizer::{RuleRegistry, SynthesisOptions};
use dq_core::{RuleCatalog, TableDescriptor};
use dq_db::Warehouse;
use std::time::{Duration, Instant};

/// Settings for a test run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub catalog: RuleCatalog,
    pub synthesis: SynthesisOptions,
    /// Budget for each test query
    pub query_timeout: Duration,
}

/// Specifications for every table that could be described
#[derive(Debug, Clone, Default)]
pub struct TestPlan {
    /// Specifications in execution order
    pub specs: Vec<TestSpec>,

    /// Tables dropped before synthesis
    pub skipped: Vec<SkippedTable>,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One result per executed specification, in synthesis order
    pub results: Vec<TestResult>,

    pub summary: RunSummary,

    /// Tables dropped from the run
    pub skipped: Vec<SkippedTable>,
}

/// Describe tables and synthesize their specifications without running them
pub async fn plan_tests(
    warehouse: &dyn Warehouse,
    tables: &[ActiveTable],
    catalog: &RuleCatalog,
    synthesis: &SynthesisOptions,
) -> TestPlan {
    let registry = RuleRegistry::builtin();
    let mut plan = TestPlan::default();

    for target in tables {
        let columns = match warehouse.describe_table(&target.table).await {
            Ok(columns) => columns,
            Err(e) => {
                log::warn!("Skipping {}: could not describe table: {e}", target.table);
                plan.skipped.push(SkippedTable {
                    table: target.table.clone(),
                    reason: SkipReason::DescribeFailed(e.to_string()),
                });
                continue;
            }
        };

        let descriptor =
            TableDescriptor::new(target.table.clone(), columns, target.time_column.clone());
        let specs = registry.synthesize(&descriptor, catalog, synthesis);
        if specs.is_empty() {
            log::info!("No tests inferred for {}, skipping", target.table);
            continue;
        }
        log::info!("Inferred {} tests for {}", specs.len(), target.table);
        plan.specs.extend(specs);
    }

    plan
}

/// Infer and execute checks for every table, in order
pub async fn run_checks(
    warehouse: &dyn Warehouse,
    tables: &[ActiveTable],
    options: &RunOptions,
) -> RunReport {
    let start = Instant::now();
    let plan = plan_tests(warehouse, tables, &options.catalog, &options.synthesis).await;

    log::info!(
        "Running {} tests on {} ({}s timeout per test)",
        plan.specs.len(),
        warehouse.db_type(),
        options.query_timeout.as_secs_f64()
    );
    let executor = TestExecutor::new(warehouse, options.query_timeout);
    let results = executor.run_all(&plan.specs).await;

    let summary = RunSummary::from_results(&results, start.elapsed());
    log::info!("{summary}");

    RunReport {
        results,
        summary,
        skipped: plan.skipped,
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
