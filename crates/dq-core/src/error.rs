//! Error types for dq-core

use thiserror::Error;

/// Core error type for autodq
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Table name is not a three-part database.schema.table name
    #[error("[E004] Invalid qualified name '{name}': expected database.schema.table")]
    InvalidQualifiedName { name: String },

    /// E005: Identifier contains characters outside the allow-list
    #[error("[E005] Invalid identifier '{ident}': {reason}")]
    InvalidIdentifier { ident: String, reason: String },

    /// E006: Unknown test kind name
    #[error("[E006] Unknown test kind '{name}' (expected not_null, unique or custom_condition)")]
    UnknownTestKind { name: String },

    /// E007: Unknown SQL dialect name
    #[error("[E007] Unknown dialect '{name}' (expected duckdb or snowflake)")]
    UnknownDialect { name: String },

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
