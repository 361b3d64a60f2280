//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use dq_core::{Config, QualifiedName};
use dq_test::{DiscoveryOptions, RunOptions, SynthesisOptions};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and the DuckDB connection closes cleanly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs downcasts it before printing errors.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Parse `database.schema.table` arguments
pub(crate) fn parse_table_names(names: &[String]) -> Result<Vec<QualifiedName>> {
    names
        .iter()
        .map(|name| {
            name.parse::<QualifiedName>()
                .with_context(|| format!("Invalid --table value '{name}'"))
        })
        .collect()
}

/// Discovery settings from the `discovery` and `always_include` config
pub(crate) fn discovery_options(config: &Config) -> DiscoveryOptions {
    DiscoveryOptions {
        activity_days: config.discovery.activity_days,
        probe_timeout: config.discovery.probe_timeout(),
        time_column_priority: config.discovery.time_column_priority.clone(),
        always_include: config.always_include.clone(),
    }
}

/// Window settings for synthesis
///
/// `--all-days` turns off the previous-day window; `--trailing-days`
/// overrides the configured trailing window.
pub(crate) fn synthesis_options(
    config: &Config,
    all_days: bool,
    trailing_days: Option<u32>,
) -> SynthesisOptions {
    SynthesisOptions::new(
        config.execution.recent_window_only && !all_days,
        trailing_days.or(config.execution.trailing_days),
    )
}

/// Run settings from config plus the command-line window flags
pub(crate) fn run_options(config: &Config, synthesis: SynthesisOptions) -> RunOptions {
    RunOptions {
        catalog: config.catalog.clone(),
        synthesis,
        query_timeout: config.execution.query_timeout(),
    }
}

/// Serialize `data` as pretty-printed JSON and write it to `path`.
///
/// Creates any missing parent directories before writing.
pub(crate) fn write_json_results<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(data).context("Failed to serialize results")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

/// Print rows as a left-aligned table with a dashed header rule.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);
    let format_row = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", format_row(headers.to_vec()));
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", format_row(rule.iter().map(String::as_str).collect()));
    for row in rows {
        println!("{}", format_row(row.iter().map(String::as_str).collect()));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
