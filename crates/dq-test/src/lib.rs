//! dq-test - Rule inference and test execution for autodq
//!
//! This crate turns a table's column catalog into data-quality test
//! specifications, compiles them to count queries and runs them against a
//! warehouse.

pub mod compiler;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod expr;
pub mod orchestrator;
pub mod result;
pub mod rules;
pub mod spec;
pub mod synthesizer;

pub use compiler::compile;
pub use discovery::{
    discover_active_tables, resolve_table, ActiveTable, DiscoveryOptions, DiscoveryReport,
    SkipReason, SkippedTable,
};
pub use error::{CompileError, CompileResult};
pub use executor::TestExecutor;
pub use expr::Expr;
pub use orchestrator::{plan_tests, run_checks, RunOptions, RunReport, TestPlan};
pub use result::{RunSummary, TestOutcome, TestResult, TestStatus};
pub use spec::{TestKind, TestSpec, TimeWindow, WindowMode};
pub use synthesizer::{synthesize, RuleRegistry, SynthesisOptions};
