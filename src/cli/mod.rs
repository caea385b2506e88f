//! CLI module
//!
//! Command-line interface for running the job.
//!
//! # Commands
//!
//! - `run` - Build and write the five tables
//! - `inspect` - Row counts and partitions of written tables
//! - `schema` - Output table schemas

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
