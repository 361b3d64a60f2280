//! Runtime context for CLI commands

use anyhow::{Context, Result};
use dq_core::{Config, CoreError};
use dq_db::{DuckDbBackend, Warehouse};
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Runtime context containing loaded configuration and warehouse connection
pub struct RuntimeContext {
    /// The loaded configuration
    pub config: Config,

    /// Warehouse connection
    pub warehouse: Arc<dyn Warehouse>,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let config = load_config(args)?;

        // Create warehouse connection (use --database override if provided)
        let db_path = args
            .database
            .as_deref()
            .unwrap_or(&config.warehouse.path);
        log::debug!("Connecting to {db_path}");
        let warehouse: Arc<dyn Warehouse> = Arc::new(
            DuckDbBackend::new(db_path)
                .with_context(|| format!("Failed to connect to warehouse at {db_path}"))?,
        );

        Ok(Self { config, warehouse })
    }

    /// Borrow the warehouse as a trait object
    pub fn warehouse(&self) -> &dyn Warehouse {
        self.warehouse.as_ref()
    }
}

/// Load config from `--config`, or autodq.yml in the project directory
///
/// A missing autodq.yml in the project directory falls back to defaults; an
/// explicit `--config` must exist.
pub fn load_config(args: &GlobalArgs) -> Result<Config> {
    if let Some(config_path) = &args.config {
        return Config::load(Path::new(config_path)).context("Failed to load configuration file");
    }

    match Config::load_from_dir(Path::new(&args.project_dir)) {
        Ok(config) => Ok(config),
        Err(CoreError::ConfigNotFound { path }) => {
            log::info!("No configuration at {path}, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).context("Failed to load project configuration"),
    }
}
