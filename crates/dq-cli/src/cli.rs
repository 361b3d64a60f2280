//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use dq_core::Dialect;

/// autodq - infer and run data-quality checks from column naming conventions
#[derive(Parser, Debug)]
#[command(name = "autodq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory searched for autodq.yml
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true, env = "AUTODQ_CONFIG")]
    pub config: Option<String>,

    /// Override warehouse path (DuckDB file or :memory:)
    #[arg(short, long, global = true, env = "AUTODQ_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover active tables, infer checks and execute them
    Run(RunArgs),

    /// Show the checks inferred for a table without running them
    Rules(RulesArgs),

    /// List active and skipped tables
    Discover(DiscoverArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Fully qualified table (database.schema.table) to test; repeatable.
    /// Bypasses discovery.
    #[arg(short, long = "table", value_name = "FQN")]
    pub tables: Vec<String>,

    /// Scan whole tables instead of the previous calendar day
    #[arg(long)]
    pub all_days: bool,

    /// With --all-days, only scan rows from the last N days
    #[arg(
        long,
        value_name = "N",
        requires = "all_days",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub trailing_days: Option<u32>,

    /// Override the results file path
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the rules command
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Fully qualified table (database.schema.table)
    #[arg(short, long, value_name = "FQN")]
    pub table: String,

    /// Also print the compiled SQL for each check
    #[arg(long)]
    pub sql: bool,

    /// SQL dialect for --sql (default: from config)
    #[arg(long, value_enum)]
    pub dialect: Option<DialectArg>,

    /// Show whole-table checks instead of previous-day ones
    #[arg(long)]
    pub all_days: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: RulesOutput,
}

/// Arguments for the discover command
#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: DiscoverOutput,
}

/// Dialect names accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectArg {
    Duckdb,
    Snowflake,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Snowflake => Dialect::Snowflake,
        }
    }
}

/// Output formats for the rules command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesOutput {
    /// Aligned table
    Table,
    /// JSON array of specifications
    Json,
}

/// Output formats for the discover command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverOutput {
    /// Aligned table
    Table,
    /// JSON discovery report
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
