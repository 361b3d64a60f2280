//! dq-db - Warehouse abstraction layer for autodq
//!
//! This crate provides the `Warehouse` trait the rule engine runs against,
//! the typed error taxonomy for warehouse failures, and an embedded DuckDB
//! implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Warehouse;
