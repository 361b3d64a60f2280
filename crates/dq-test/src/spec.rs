//! Test specifications produced by the synthesizer

use crate::expr::Expr;
use dq_core::{CoreError, QualifiedName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of assertion a specification makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Target column must not be NULL
    NotNull,
    /// Non-NULL values of the target column must not repeat
    Unique,
    /// Rows matching the condition are violations
    CustomCondition,
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::NotNull => "not_null",
            TestKind::Unique => "unique",
            TestKind::CustomCondition => "custom_condition",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_null" => Ok(TestKind::NotNull),
            "unique" => Ok(TestKind::Unique),
            "custom_condition" => Ok(TestKind::CustomCondition),
            other => Err(CoreError::UnknownTestKind {
                name: other.to_string(),
            }),
        }
    }
}

/// How a time window restricts the rows a test looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Whole table
    None,
    /// Rows from the last `n` days up to now
    TrailingDays(u32),
    /// Rows from yesterday only
    PreviousCalendarDay,
}

/// Time filter applied around a test's violation predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Column the window filters on
    pub column: Option<String>,

    pub mode: WindowMode,
}

impl TimeWindow {
    /// No time restriction
    pub fn none() -> Self {
        Self {
            column: None,
            mode: WindowMode::None,
        }
    }

    /// Whether the window filters anything
    pub fn is_active(&self) -> bool {
        self.column.is_some() && self.mode != WindowMode::None
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::none()
    }
}

/// One inferred data-quality assertion, ready for compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpec {
    pub kind: TestKind,

    pub table: QualifiedName,

    /// One column for simple rules, several for cross-column rules, empty
    /// for table-level rules
    pub target_columns: Vec<String>,

    /// Predicate that is TRUE for a violating row (custom_condition only)
    pub condition: Option<Expr>,

    pub time_window: TimeWindow,

    /// Human-readable description naming the rule that produced it
    pub description: String,

    /// Name of the rule that produced this specification
    pub rule: String,
}

impl TestSpec {
    /// Comma-joined target columns, or `N/A` for table-level tests
    pub fn columns_label(&self) -> String {
        if self.target_columns.is_empty() {
            "N/A".to_string()
        } else {
            self.target_columns.join(",")
        }
    }
}
