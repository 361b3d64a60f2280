//! Rules command implementation

use anyhow::{Context, Result};
use dq_core::{Config, Dialect, QualifiedName, TableDescriptor};
use dq_db::Warehouse;
use dq_test::discovery::pick_time_column;
use dq_test::{compile, RuleRegistry, TestSpec};
use serde::Serialize;

use crate::cli::{GlobalArgs, RulesArgs, RulesOutput};
use crate::commands::common::{print_table, synthesis_options};
use crate::context::RuntimeContext;

/// One inferred check, optionally with its compiled query
#[derive(Debug, Serialize)]
pub(crate) struct RuleRow {
    #[serde(flatten)]
    pub spec: TestSpec,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

/// Everything the rules command shows for one table
#[derive(Debug)]
pub(crate) struct RuleListing {
    pub table: TableDescriptor,
    pub rows: Vec<RuleRow>,
}

/// Execute the rules command
pub async fn execute(args: &RulesArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let listing = list_rules(&ctx.config, ctx.warehouse(), args).await?;

    match args.output {
        RulesOutput::Json => {
            let json = serde_json::to_string_pretty(&listing.rows)
                .context("Failed to serialize rules")?;
            println!("{json}");
        }
        RulesOutput::Table => print_listing(&ctx.config, &listing),
    }
    Ok(())
}

/// Describe the table and synthesize its checks without running them
pub(crate) async fn list_rules(
    config: &Config,
    warehouse: &dyn Warehouse,
    args: &RulesArgs,
) -> Result<RuleListing> {
    let name: QualifiedName = args
        .table
        .parse()
        .with_context(|| format!("Invalid --table value '{}'", args.table))?;
    let columns = warehouse
        .describe_table(&name)
        .await
        .with_context(|| format!("Failed to describe {name}"))?;
    let time_column = pick_time_column(&columns, &config.discovery.time_column_priority);
    let table = TableDescriptor::new(name, columns, time_column);

    let synthesis = synthesis_options(config, args.all_days, None);
    let specs = RuleRegistry::builtin().synthesize(&table, &config.catalog, &synthesis);

    let dialect = args
        .dialect
        .map(Dialect::from)
        .unwrap_or(config.warehouse.dialect);
    let rows = specs
        .into_iter()
        .map(|spec| {
            let sql = if args.sql {
                Some(compile(&spec, dialect).with_context(|| {
                    format!("Failed to compile {} on {}", spec.rule, spec.columns_label())
                })?)
            } else {
                None
            };
            Ok(RuleRow { spec, sql })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RuleListing { table, rows })
}

fn print_listing(config: &Config, listing: &RuleListing) {
    let registry = RuleRegistry::builtin();
    let table = &listing.table;

    println!("{}", table.qualified_name);
    match &table.primary_time_column {
        Some(column) => println!("Time column: {column}\n"),
        None => println!("Time column: none\n"),
    }

    let column_rows: Vec<Vec<String>> = table
        .columns
        .iter()
        .map(|c| {
            let matched = registry.matching_rules(c, &config.catalog);
            vec![
                c.name.clone(),
                c.declared_type.clone(),
                if matched.is_empty() {
                    "-".to_string()
                } else {
                    matched.join(", ")
                },
            ]
        })
        .collect();
    print_table(&["COLUMN", "TYPE", "RULES"], &column_rows);
    println!();

    if listing.rows.is_empty() {
        println!("No checks inferred.");
        return;
    }

    let spec_rows: Vec<Vec<String>> = listing
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            vec![
                (i + 1).to_string(),
                row.spec.rule.clone(),
                row.spec.kind.to_string(),
                row.spec.columns_label(),
            ]
        })
        .collect();
    print_table(&["#", "RULE", "KIND", "COLUMNS"], &spec_rows);

    for (i, row) in listing.rows.iter().enumerate() {
        if let Some(sql) = &row.sql {
            println!("\n-- {}. {}\n{};", i + 1, row.spec.description, sql);
        }
    }
}

#[cfg(test)]
#[path = "rules_test.rs"]
mod tests;
