//! Output module
//!
//! Turns finished tables into Hive-partitioned Parquet datasets.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Encoding Arrow RecordBatches as Parquet
//! - Splitting batches into `col=value` partitions
//! - Writing whole tables through a [`TableSink`], replacing previous output
//! - Reading written tables back with their partition columns restored

mod partition;
mod reader;
mod sink;
mod writer;

pub use partition::{
    escape_path_name, parse_partition_dirs, partition_value, split_by_partition,
    unescape_path_name, PartitionSlice, DEFAULT_PARTITION,
};
pub use reader::{concat_parts, read_table, TablePart};
pub use sink::{DryRunSink, ObjectStoreSink, TableSink, WriteSummary, SUCCESS_MARKER};
pub use writer::{encode_parquet, CompressionKind, ParquetWriter, ParquetWriterConfig};
