//! Configuration types and parsing for autodq.yml

use crate::catalog::RuleCatalog;
use crate::dialect::Dialect;
use crate::error::{CoreError, CoreResult};
use crate::sql_utils::validate_identifier;
use crate::table::QualifiedName;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration from autodq.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Warehouse connection and SQL dialect
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Schemas scanned during discovery
    #[serde(default)]
    pub schemas: Vec<SchemaScope>,

    /// Tables tested even when the activity probe says they are stale
    #[serde(default)]
    pub always_include: Vec<QualifiedName>,

    /// Per-test execution settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Table discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Result persistence
    #[serde(default)]
    pub output: OutputConfig,

    /// Convention catalog; omitted means the built-in catalog
    #[serde(default)]
    pub catalog: RuleCatalog,
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarehouseConfig {
    /// Database path (DuckDB file or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQL dialect used to render test queries
    #[serde(default)]
    pub dialect: Dialect,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            dialect: Dialect::default(),
        }
    }
}

/// A `database.schema` pair to scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaScope {
    pub database: String,
    pub schema: String,
}

impl std::fmt::Display for SchemaScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.schema)
    }
}

/// Execution settings applied to every test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Per-query timeout
    #[serde(default = "default_query_timeout")]
    pub query_timeout_seconds: u64,

    /// Restrict every test to the previous calendar day
    #[serde(default = "default_true")]
    pub recent_window_only: bool,

    /// Trailing window used when `recent_window_only` is false
    #[serde(default)]
    pub trailing_days: Option<u32>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            query_timeout_seconds: default_query_timeout(),
            recent_window_only: true,
            trailing_days: None,
        }
    }
}

impl ExecutionConfig {
    /// Per-query timeout as a `Duration`
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_seconds)
    }
}

/// Discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// A table is active if its time column has rows within this many days
    #[serde(default = "default_activity_days")]
    pub activity_days: u32,

    /// Timeout for the activity probe query
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,

    /// Preferred time column names, highest priority first
    #[serde(default = "default_time_column_priority")]
    pub time_column_priority: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            activity_days: default_activity_days(),
            probe_timeout_seconds: default_probe_timeout(),
            time_column_priority: default_time_column_priority(),
        }
    }
}

impl DiscoveryConfig {
    /// Probe timeout as a `Duration`
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}

/// Where results are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// JSON file receiving the flat result list
    #[serde(default = "default_results_path")]
    pub results_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_true() -> bool {
    true
}

fn default_query_timeout() -> u64 {
    30
}

fn default_activity_days() -> u32 {
    30
}

fn default_probe_timeout() -> u64 {
    15
}

fn default_results_path() -> String {
    "dq_reports/dq_results.json".to_string()
}

fn default_time_column_priority() -> Vec<String> {
    [
        "UPDATED_AT",
        "UPDATEDAT",
        "CREATED_AT",
        "CREATEDAT",
        "TIMESTAMP",
        "EVENTTIMESTAMP",
        "DATE",
        "DATE_PART",
        "ACTIVE_DATE",
        "INSTALL_DATE",
        "REGISTERED_AT",
        "LAST_ACTIVE",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for autodq.yml or autodq.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("autodq.yml");
        let yaml_path = dir.join("autodq.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.execution.query_timeout_seconds == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "execution.query_timeout_seconds must be greater than 0".to_string(),
            });
        }
        if self.execution.trailing_days == Some(0) {
            return Err(CoreError::ConfigInvalid {
                message: "execution.trailing_days must be greater than 0 when set".to_string(),
            });
        }
        if self.discovery.activity_days == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "discovery.activity_days must be greater than 0".to_string(),
            });
        }
        for scope in &self.schemas {
            validate_identifier(&scope.database)
                .and_then(|_| validate_identifier(&scope.schema))
                .map_err(|e| CoreError::ConfigInvalid {
                    message: format!("schema scope '{}': {}", scope, e),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
