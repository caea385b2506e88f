//! Storage module
//!
//! Object storage access for the job's input and output roots.
//!
//! # Overview
//!
//! This module provides:
//! - `StorageLocation` - a root URL (local path, S3, R2, GCS, Azure or in-memory)
//!   backed by an `object_store` implementation
//! - `GlobPattern` - `*`/`?` path globs used to select input files

mod glob;
mod location;

pub use glob::GlobPattern;
pub use location::StorageLocation;
