//! Spec resolution for array batch jobs: the index-range codec, template
//! merge, validation and status aggregation.

pub mod admission;
pub mod api;
pub mod config;
pub mod diagnostics;
pub mod field;
pub mod merge;
pub mod range;
pub mod report;
pub mod status;
pub mod validate;

pub type Result<T> = anyhow::Result<T>;
