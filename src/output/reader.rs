//! Reading written tables back
//!
//! Restores partition columns from the `col=value` directories so every part
//! comes back with the full table schema.

use super::partition::parse_partition_dirs;
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use crate::tables::TableDef;
use arrow::array::{new_null_array, ArrayRef, Int32Array, Int64Array, StringArray};
use arrow::compute::concat_batches;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::sync::Arc;

/// One data file of a table
#[derive(Debug, Clone)]
pub struct TablePart {
    /// Path relative to the output root
    pub path: String,
    /// Partition values from the directory names
    pub partition: Vec<(String, Option<String>)>,
    /// Rows with the full table schema
    pub batch: RecordBatch,
}

/// Read every data file of a table, in path order
pub async fn read_table(location: &StorageLocation, table: &TableDef) -> Result<Vec<TablePart>> {
    let files: Vec<String> = location
        .list(table.name)
        .await?
        .into_iter()
        .filter(|path| path.ends_with(".parquet"))
        .collect();

    let mut parts = Vec::with_capacity(files.len());
    for path in files {
        let data = location.get(&path).await?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(data)?;
        let file_schema = Arc::clone(builder.schema());
        let batches = builder
            .build()?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let file_batch = concat_batches(&file_schema, &batches)?;

        let relative = path.strip_prefix(table.name).unwrap_or(&path);
        let partition = parse_partition_dirs(relative);
        let batch = restore_partition_columns(table, &file_batch, &partition)?;
        parts.push(TablePart {
            path,
            partition,
            batch,
        });
    }
    Ok(parts)
}

/// Concatenate parts into one batch with the table schema
pub fn concat_parts(table: &TableDef, parts: &[TablePart]) -> Result<RecordBatch> {
    let batches: Vec<RecordBatch> = parts.iter().map(|p| p.batch.clone()).collect();
    Ok(concat_batches(&table.schema, &batches)?)
}

fn restore_partition_columns(
    table: &TableDef,
    file_batch: &RecordBatch,
    partition: &[(String, Option<String>)],
) -> Result<RecordBatch> {
    let rows = file_batch.num_rows();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(table.schema.fields().len());

    for field in table.schema.fields() {
        if let Some(column) = file_batch.column_by_name(field.name()) {
            columns.push(Arc::clone(column));
            continue;
        }

        let value = partition
            .iter()
            .find(|(name, _)| name == field.name())
            .map(|(_, value)| value.as_deref())
            .ok_or_else(|| {
                Error::output(
                    table.name,
                    format!("column '{}' missing from file and path", field.name()),
                )
            })?;
        columns.push(constant_column(table.name, field.data_type(), value, rows)?);
    }

    Ok(RecordBatch::try_new(Arc::clone(&table.schema), columns)?)
}

fn constant_column(
    table: &str,
    data_type: &DataType,
    value: Option<&str>,
    rows: usize,
) -> Result<ArrayRef> {
    let Some(text) = value else {
        return Ok(new_null_array(data_type, rows));
    };
    let invalid = |e: std::num::ParseIntError| {
        Error::output(table, format!("invalid partition value '{text}': {e}"))
    };

    let array: ArrayRef = match data_type {
        DataType::Utf8 => Arc::new(StringArray::from(vec![text; rows])),
        DataType::Int32 => Arc::new(Int32Array::from(vec![
            text.parse::<i32>().map_err(invalid)?;
            rows
        ])),
        DataType::Int64 => Arc::new(Int64Array::from(vec![
            text.parse::<i64>().map_err(invalid)?;
            rows
        ])),
        other => {
            return Err(Error::output(
                table,
                format!("unsupported partition column type {other}"),
            ))
        }
    };
    Ok(array)
}
