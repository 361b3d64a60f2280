//! Discover command implementation

use anyhow::{Context, Result};
use dq_test::{discover_active_tables, DiscoveryReport};

use crate::cli::{DiscoverArgs, DiscoverOutput, GlobalArgs};
use crate::commands::common::{discovery_options, print_table};
use crate::context::RuntimeContext;

/// Execute the discover command
pub async fn execute(args: &DiscoverArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    if ctx.config.schemas.is_empty() && ctx.config.always_include.is_empty() {
        log::warn!("No schemas or always_include tables configured");
    }

    let report = discover_active_tables(
        ctx.warehouse(),
        &ctx.config.schemas,
        &discovery_options(&ctx.config),
    )
    .await;

    match args.output {
        DiscoverOutput::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize discovery report")?;
            println!("{json}");
        }
        DiscoverOutput::Table => print_report(&report),
    }
    Ok(())
}

/// Rows for the discovery table: active tables first, then skipped ones
pub(crate) fn report_rows(report: &DiscoveryReport) -> Vec<Vec<String>> {
    let active = report.active.iter().map(|t| {
        vec![
            t.table.to_string(),
            "active".to_string(),
            t.time_column.clone().unwrap_or_else(|| "-".to_string()),
        ]
    });
    let skipped = report.skipped.iter().map(|s| {
        vec![
            s.table.to_string(),
            "skipped".to_string(),
            s.reason.to_string(),
        ]
    });
    active.chain(skipped).collect()
}

fn print_report(report: &DiscoveryReport) {
    let rows = report_rows(report);
    if rows.is_empty() {
        println!("No tables found.");
        return;
    }
    print_table(&["TABLE", "STATUS", "DETAIL"], &rows);
    println!(
        "\n{} active, {} skipped",
        report.active.len(),
        report.skipped.len()
    );
}
