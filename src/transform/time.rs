//! Timestamp and surrogate id derivation

use chrono::{DateTime, Utc};

/// Bits reserved for the row index inside one partition
const ROW_INDEX_BITS: u32 = 33;

/// Convert an event time in epoch milliseconds to a UTC timestamp
///
/// Millisecond precision is kept. Values outside chrono's range yield `None`.
pub fn derive_start_time(ts_millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ts_millis)
}

/// Surrogate id for the `row_index`-th row of the `partition`-th partition
///
/// Increasing within a partition and unique within one run; partitions are
/// spaced `2^33` ids apart.
pub fn songplay_id(partition: usize, row_index: usize) -> i64 {
    ((partition as i64) << ROW_INDEX_BITS) + row_index as i64
}
