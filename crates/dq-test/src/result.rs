//! Test results and run summary

use crate::spec::{TestKind, TestSpec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Violation count recorded for tests that did not produce one
pub const NO_COUNT: i64 = -1;

/// Terminal status of one executed test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
    Timeout,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::Error => "error",
            TestStatus::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Outcome of running one compiled statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    /// Query finished and found no violations
    Passed,
    /// Query finished and counted this many violations
    Failed(i64),
    /// Compilation or execution failed
    Errored(String),
    /// Query exceeded its timeout budget
    TimedOut,
}

impl TestOutcome {
    /// Classify a scalar violation count
    pub fn from_count(count: i64) -> Self {
        match count {
            0 => TestOutcome::Passed,
            n if n > 0 => TestOutcome::Failed(n),
            n => TestOutcome::Errored(format!("query returned negative count {n}")),
        }
    }

    pub fn status(&self) -> TestStatus {
        match self {
            TestOutcome::Passed => TestStatus::Pass,
            TestOutcome::Failed(_) => TestStatus::Fail,
            TestOutcome::Errored(_) => TestStatus::Error,
            TestOutcome::TimedOut => TestStatus::Timeout,
        }
    }

    /// Violation count, or [`NO_COUNT`] when the query did not finish
    pub fn violation_count(&self) -> i64 {
        match self {
            TestOutcome::Passed => 0,
            TestOutcome::Failed(n) => *n,
            TestOutcome::Errored(_) | TestOutcome::TimedOut => NO_COUNT,
        }
    }
}

/// Persisted record of one executed test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Qualified table name
    pub table: String,

    /// Comma-joined target columns, `N/A` for table-level tests
    pub columns: String,

    pub kind: TestKind,

    pub status: TestStatus,

    /// Violating rows (duplicate groups for `unique`), -1 on error or timeout
    pub violation_count: i64,

    pub description: String,

    pub observed_at: DateTime<Utc>,

    /// Error text for `error` results; not part of the persisted record
    #[serde(skip)]
    pub error: Option<String>,
}

impl TestResult {
    /// Build the record for a specification and its outcome
    pub fn new(spec: &TestSpec, outcome: &TestOutcome) -> Self {
        Self {
            table: spec.table.to_string(),
            columns: spec.columns_label(),
            kind: spec.kind,
            status: outcome.status(),
            violation_count: outcome.violation_count(),
            description: spec.description.clone(),
            observed_at: Utc::now(),
            error: match outcome {
                TestOutcome::Errored(reason) => Some(reason.clone()),
                _ => None,
            },
        }
    }
}

/// Summary of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Total tests executed
    pub total: usize,

    pub passed: usize,

    pub failed: usize,

    pub errors: usize,

    pub timeouts: usize,

    /// Wall-clock time of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Create a summary from test results
    pub fn from_results(results: &[TestResult], duration: Duration) -> Self {
        let count = |status: TestStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            total: results.len(),
            passed: count(TestStatus::Pass),
            failed: count(TestStatus::Fail),
            errors: count(TestStatus::Error),
            timeouts: count(TestStatus::Timeout),
            duration,
        }
    }

    /// No test failed, errored or timed out
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0 && self.timeouts == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tests: {} passed, {} failed, {} errors, {} timeouts ({:.2}s)",
            self.total,
            self.passed,
            self.failed,
            self.errors,
            self.timeouts,
            self.duration.as_secs_f64()
        )
    }
}
