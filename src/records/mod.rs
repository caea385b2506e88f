//! Raw input records
//!
//! Song metadata and event log records as read from JSON. Every field is
//! optional: missing fields, JSON `null` and values of an unusable type all
//! read as `None`, so reading a record never fails.

mod fields;
mod types;

pub use fields::{float_field, int_field, string_field};
pub use types::{LogRecord, SongRecord};
