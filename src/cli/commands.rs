//! CLI commands and argument parsing

use crate::decode::ReadMode;
use crate::pipeline::Stages;
use crate::transform::JoinKeyKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sparkify song play ETL
#[derive(Parser, Debug)]
#[command(name = "sparkify-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Job configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the five tables from the raw song and log data
    Run {
        /// Input root (local path or cloud URL)
        /// Supports: /path, s3://bucket/path, s3a://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path
        #[arg(short, long)]
        input: Option<String>,

        /// Output root (local path or cloud URL)
        #[arg(short, long)]
        output: Option<String>,

        /// Stages to run
        #[arg(long, default_value = "all")]
        stage: Stages,

        /// Handling of malformed JSON lines
        #[arg(long)]
        mode: Option<ReadMode>,

        /// Join predicate between log events and songs
        #[arg(long)]
        join_key: Option<JoinKeyKind>,

        /// Build the tables but write nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show row counts and partitions of written tables
    Inspect {
        /// Output root to inspect
        #[arg(short, long)]
        output: Option<String>,

        /// Only this table
        #[arg(short, long)]
        table: Option<String>,

        /// Sample rows to print per table
        #[arg(long, default_value = "0")]
        limit: usize,
    },

    /// Print the output table schemas
    Schema,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
