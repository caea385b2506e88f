//! Table sinks
//!
//! A sink receives one complete table at a time. [`ObjectStoreSink`] writes
//! partitioned Parquet to a storage location, replacing what was there;
//! [`DryRunSink`] only plans the write.

use super::partition::split_by_partition;
use super::writer::{encode_parquet, ParquetWriterConfig};
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use crate::tables::TableDef;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;
use tracing::{debug, info};

/// Marker object written after a table completes
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// What a table write produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Table name
    pub table: String,
    /// Rows written
    pub rows: usize,
    /// Data files written
    pub files: usize,
    /// Distinct partitions (0 for unpartitioned tables)
    pub partitions: usize,
    /// Objects removed from the previous run
    pub replaced: usize,
}

/// Destination for finished tables
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Write a whole table; `batch` carries the full table schema
    async fn write_table(&self, table: &TableDef, batch: RecordBatch) -> Result<WriteSummary>;
}

fn check_schema(table: &TableDef, batch: &RecordBatch) -> Result<()> {
    if batch.schema() != table.schema {
        return Err(Error::output(
            table.name,
            "batch schema does not match table schema",
        ));
    }
    Ok(())
}

fn part_path(table: &str, dir: &str, index: usize) -> String {
    if dir.is_empty() {
        format!("{table}/part-{index:05}.parquet")
    } else {
        format!("{table}/{dir}/part-{index:05}.parquet")
    }
}

// ============================================================================
// Object Store Sink
// ============================================================================

/// Writes tables as Hive-partitioned Parquet under a storage location
pub struct ObjectStoreSink {
    location: StorageLocation,
    config: ParquetWriterConfig,
}

impl ObjectStoreSink {
    /// Create a sink over an output location
    pub fn new(location: StorageLocation, config: ParquetWriterConfig) -> Self {
        Self { location, config }
    }

    /// The output location
    pub fn location(&self) -> &StorageLocation {
        &self.location
    }
}

#[async_trait]
impl TableSink for ObjectStoreSink {
    async fn write_table(&self, table: &TableDef, batch: RecordBatch) -> Result<WriteSummary> {
        check_schema(table, &batch)?;

        let replaced = self.location.delete_prefix(table.name).await?;
        if replaced > 0 {
            debug!(table = table.name, objects = replaced, "Removed previous output");
        }

        let mut summary = WriteSummary {
            table: table.name.to_string(),
            rows: batch.num_rows(),
            replaced,
            ..WriteSummary::default()
        };

        if batch.num_rows() == 0 {
            // Keep the schema discoverable even without rows
            let data = encode_parquet(&batch, &self.config)?;
            self.location.put(&part_path(table.name, "", 0), data).await?;
            summary.files = 1;
        } else {
            let slices = split_by_partition(&batch, table.partition_by)?;
            for slice in &slices {
                let path = part_path(table.name, &slice.dir(), 0);
                let data = encode_parquet(&slice.batch, &self.config)?;
                let written = self.location.put(&path, data).await?;
                debug!(path = %written, rows = slice.batch.num_rows(), "Wrote data file");
            }
            summary.files = slices.len();
            if table.is_partitioned() {
                summary.partitions = slices.len();
            }
        }

        self.location
            .put(&format!("{}/{SUCCESS_MARKER}", table.name), Bytes::new())
            .await?;

        info!(
            table = table.name,
            rows = summary.rows,
            files = summary.files,
            partitions = summary.partitions,
            "Wrote table to {}",
            self.location.display_path(table.name)
        );
        Ok(summary)
    }
}

// ============================================================================
// Dry Run Sink
// ============================================================================

/// Plans writes without touching storage
#[derive(Default)]
pub struct DryRunSink {
    planned: Mutex<Vec<WriteSummary>>,
}

impl DryRunSink {
    /// Create an empty dry-run sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes planned so far, in call order
    pub fn planned(&self) -> Vec<WriteSummary> {
        self.planned
            .lock()
            .map(|planned| planned.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TableSink for DryRunSink {
    async fn write_table(&self, table: &TableDef, batch: RecordBatch) -> Result<WriteSummary> {
        check_schema(table, &batch)?;

        let (files, partitions) = if batch.num_rows() == 0 {
            (1, 0)
        } else {
            let slices = split_by_partition(&batch, table.partition_by)?;
            let partitions = if table.is_partitioned() { slices.len() } else { 0 };
            (slices.len(), partitions)
        };

        let summary = WriteSummary {
            table: table.name.to_string(),
            rows: batch.num_rows(),
            files,
            partitions,
            replaced: 0,
        };
        info!(
            table = table.name,
            rows = summary.rows,
            files = summary.files,
            partitions = summary.partitions,
            "Dry run: table not written"
        );

        if let Ok(mut planned) = self.planned.lock() {
            planned.push(summary.clone());
        }
        Ok(summary)
    }
}
