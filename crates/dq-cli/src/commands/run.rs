//! Run command implementation

use anyhow::Result;
use dq_core::Config;
use dq_db::Warehouse;
use dq_test::{
    discover_active_tables, resolve_table, run_checks, ActiveTable, RunReport, SkippedTable,
    TestStatus,
};
use std::path::Path;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{
    discovery_options, parse_table_names, print_table, run_options, synthesis_options,
    write_json_results, ExitCode,
};
use crate::context::RuntimeContext;

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let report = run_tables(&ctx.config, ctx.warehouse(), args).await?;

    let results_path = args
        .output
        .as_deref()
        .unwrap_or(&ctx.config.output.results_path);
    write_json_results(Path::new(results_path), &report.results)?;
    log::info!(
        "Wrote {} results to {}",
        report.results.len(),
        results_path
    );

    print_problems(&report);
    println!("{}", report.summary);

    if !report.summary.all_passed() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Pick the tables to test, then infer and execute their checks
pub(crate) async fn run_tables(
    config: &Config,
    warehouse: &dyn Warehouse,
    args: &RunArgs,
) -> Result<RunReport> {
    let (targets, mut skipped) = select_targets(config, warehouse, &args.tables).await?;
    if targets.is_empty() {
        log::warn!("No tables to test");
    }

    let synthesis = synthesis_options(config, args.all_days, args.trailing_days);
    let mut report = run_checks(warehouse, &targets, &run_options(config, synthesis)).await;
    skipped.append(&mut report.skipped);
    report.skipped = skipped;
    Ok(report)
}

/// Explicit `--table` names bypass discovery; otherwise scan configured schemas
async fn select_targets(
    config: &Config,
    warehouse: &dyn Warehouse,
    tables: &[String],
) -> Result<(Vec<ActiveTable>, Vec<SkippedTable>)> {
    if tables.is_empty() {
        let discovered =
            discover_active_tables(warehouse, &config.schemas, &discovery_options(config)).await;
        return Ok((discovered.active, discovered.skipped));
    }

    let mut active = Vec::new();
    let mut skipped = Vec::new();
    for table in parse_table_names(tables)? {
        match resolve_table(warehouse, &table, &config.discovery.time_column_priority).await {
            Ok(target) => active.push(target),
            Err(reason) => {
                log::warn!("Skipping {table}: {reason}");
                skipped.push(SkippedTable { table, reason });
            }
        }
    }
    Ok((active, skipped))
}

/// Print every result that did not pass
fn print_problems(report: &RunReport) {
    let rows: Vec<Vec<String>> = report
        .results
        .iter()
        .filter(|r| r.status != TestStatus::Pass)
        .map(|r| {
            vec![
                r.table.clone(),
                r.columns.clone(),
                r.kind.to_string(),
                r.status.to_string(),
                r.violation_count.to_string(),
            ]
        })
        .collect();

    if !rows.is_empty() {
        print_table(&["TABLE", "COLUMNS", "KIND", "STATUS", "VIOLATIONS"], &rows);
        println!();
    }
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
