//! Error types for dq-test

use dq_core::CoreError;
use thiserror::Error;

/// Errors raised while compiling a test specification to SQL
///
/// These indicate a badly authored rule template or an identifier that
/// failed the allow-list. The executor records them as `error` results.
#[derive(Error, Debug)]
pub enum CompileError {
    /// custom_condition specification without a predicate (C001)
    #[error("[C001] custom_condition test '{rule}' has no condition")]
    MissingCondition { rule: String },

    /// Column-level kind without a target column (C002)
    #[error("[C002] {kind} test '{rule}' has no target column")]
    MissingTargetColumn { kind: String, rule: String },

    /// Identifier rejected by the allow-list (C003)
    #[error("[C003] {0}")]
    InvalidIdentifier(#[from] CoreError),
}

/// Result type alias for CompileError
pub type CompileResult<T> = Result<T, CompileError>;
