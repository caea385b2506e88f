//! Hive-style partitioning
//!
//! Rows are grouped by the text of their partition column values and each
//! group is written under `col=value/...` directories. Partition columns are
//! not stored inside the data files.

use crate::error::{Error, Result};
use arrow::array::{Array, Int32Array, Int64Array, StringArray, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// Directory value used for null (or empty) partition values
pub const DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// Characters that must be `%XX`-escaped in a partition directory name
fn needs_escape(c: char) -> bool {
    c.is_ascii_control()
        || matches!(
            c,
            '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '{' | '[' | ']' | '^'
        )
}

/// Escape a partition value for use as a path segment
pub fn escape_path_name(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if needs_escape(c) {
            let _ = write!(escaped, "%{:02X}", c as u32);
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Reverse [`escape_path_name`]; malformed escapes are kept verbatim
pub fn unescape_path_name(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest
            .get(pos + 1..pos + 3)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match code {
            Some(code) => {
                out.push(char::from(code));
                rest = &rest[pos + 3..];
            }
            None => {
                out.push('%');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Text of one partition value; `None` for null or empty
pub fn partition_value(array: &dyn Array, row: usize) -> Result<Option<String>> {
    if array.is_null(row) {
        return Ok(None);
    }
    let text = match array.data_type() {
        DataType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::Int32 => array
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row).to_string()),
        DataType::Int64 => array
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row).to_string()),
        other => {
            return Err(Error::Other(format!(
                "Unsupported partition column type: {other}"
            )))
        }
    };
    Ok(text.filter(|t| !t.is_empty()))
}

/// Rows of one partition, partition columns removed
#[derive(Debug, Clone)]
pub struct PartitionSlice {
    /// Partition column names and values, outermost first
    pub values: Vec<(String, Option<String>)>,
    /// The rows, without partition columns
    pub batch: RecordBatch,
}

impl PartitionSlice {
    /// Relative directory, e.g. `year=2018/month=11`; empty when unpartitioned
    pub fn dir(&self) -> String {
        self.values
            .iter()
            .map(|(column, value)| {
                let value = value
                    .as_deref()
                    .map_or_else(|| DEFAULT_PARTITION.to_string(), escape_path_name);
                format!("{column}={value}")
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Parse `col=value` segments of a relative path into partition values
pub fn parse_partition_dirs(path: &str) -> Vec<(String, Option<String>)> {
    path.split('/')
        .filter_map(|segment| segment.split_once('='))
        .map(|(column, value)| {
            let value = if value == DEFAULT_PARTITION {
                None
            } else {
                Some(unescape_path_name(value))
            };
            (column.to_string(), value)
        })
        .collect()
}

/// Split a batch into one slice per distinct partition value tuple
///
/// Slices are ordered by their partition values. With no partition columns
/// the batch is returned whole as a single slice.
pub fn split_by_partition(
    batch: &RecordBatch,
    partition_by: &[&str],
) -> Result<Vec<PartitionSlice>> {
    if partition_by.is_empty() {
        return Ok(vec![PartitionSlice {
            values: Vec::new(),
            batch: batch.clone(),
        }]);
    }

    let schema = batch.schema();
    let mut key_columns: Vec<&dyn Array> = Vec::with_capacity(partition_by.len());
    for name in partition_by {
        let idx = schema.index_of(name)?;
        key_columns.push(batch.column(idx).as_ref());
    }

    let mut groups: BTreeMap<Vec<Option<String>>, Vec<u32>> = BTreeMap::new();
    for row in 0..batch.num_rows() {
        let key = key_columns
            .iter()
            .map(|column| partition_value(*column, row))
            .collect::<Result<Vec<_>>>()?;
        let row = u32::try_from(row)
            .map_err(|_| Error::Other("Batch too large to partition".to_string()))?;
        groups.entry(key).or_default().push(row);
    }

    let kept: Vec<usize> = (0..schema.fields().len())
        .filter(|&i| !partition_by.contains(&schema.field(i).name().as_str()))
        .collect();
    let file_schema = Arc::new(Schema::new(
        kept.iter()
            .map(|&i| schema.field(i).clone())
            .collect::<Vec<Field>>(),
    ));

    let mut slices = Vec::with_capacity(groups.len());
    for (key, rows) in groups {
        let indices = UInt32Array::from(rows);
        let columns = kept
            .iter()
            .map(|&i| take(batch.column(i).as_ref(), &indices, None))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        slices.push(PartitionSlice {
            values: partition_by
                .iter()
                .map(|name| (*name).to_string())
                .zip(key)
                .collect(),
            batch: RecordBatch::try_new(Arc::clone(&file_schema), columns)?,
        });
    }
    Ok(slices)
}
