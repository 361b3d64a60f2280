//! dq-core - Core library for autodq
//!
//! This crate provides table and column descriptors, the convention catalog,
//! the column classifier, SQL identifier handling and configuration parsing
//! shared by all autodq components.

pub mod catalog;
pub mod classification;
pub mod config;
pub mod dialect;
pub mod error;
pub mod sql_utils;
pub mod table;

pub use catalog::{OrdinalBound, RuleCatalog, BUILTIN_CATALOG_VERSION};
pub use classification::{classify, ColumnTag};
pub use config::{Config, SchemaScope};
pub use dialect::Dialect;
pub use error::{CoreError, CoreResult};
pub use table::{ColumnDescriptor, QualifiedName, TableDescriptor};
