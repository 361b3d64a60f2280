//! CLI command implementations

pub(crate) mod common;
pub(crate) mod discover;
pub(crate) mod rules;
pub(crate) mod run;
