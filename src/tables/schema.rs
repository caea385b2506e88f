//! Arrow schemas and batch builders for the output tables

use super::types::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
use crate::error::{Error, Result};
use arrow::array::{
    ArrayRef, Float64Array, Int32Array, Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Runtime description of an output table
#[derive(Debug, Clone)]
pub struct TableDef {
    /// Table name, also its directory under the output root
    pub name: &'static str,
    /// Hive partition columns, outermost first
    pub partition_by: &'static [&'static str],
    /// Full schema, partition columns included
    pub schema: SchemaRef,
}

impl TableDef {
    /// Whether the table is written partitioned
    pub fn is_partitioned(&self) -> bool {
        !self.partition_by.is_empty()
    }

    /// Schema of the data files: the full schema minus partition columns
    pub fn file_schema(&self) -> SchemaRef {
        let fields: Vec<Field> = self
            .schema
            .fields()
            .iter()
            .filter(|f| !self.partition_by.contains(&f.name().as_str()))
            .map(|f| f.as_ref().clone())
            .collect();
        Arc::new(Schema::new(fields))
    }
}

/// A table whose rows are materialized into Arrow batches
pub trait Table {
    /// Row type produced by the transforms
    type Row;

    /// Table name
    const NAME: &'static str;

    /// Partition columns
    const PARTITION_BY: &'static [&'static str] = &[];

    /// Arrow schema of the table
    fn schema() -> SchemaRef;

    /// Column arrays for the rows, in schema order
    fn columns(rows: &[Self::Row]) -> Vec<ArrayRef>;

    /// Runtime description
    fn def() -> TableDef {
        TableDef {
            name: Self::NAME,
            partition_by: Self::PARTITION_BY,
            schema: Self::schema(),
        }
    }

    /// Build a batch; zero rows yield an empty batch with the full schema
    fn to_batch(rows: &[Self::Row]) -> Result<RecordBatch> {
        RecordBatch::try_new(Self::schema(), Self::columns(rows)).map_err(|e| {
            Error::output(Self::NAME, format!("Failed to create RecordBatch: {e}"))
        })
    }
}

/// All five tables, dimensions first
pub fn all_tables() -> Vec<TableDef> {
    vec![
        SongsTable::def(),
        ArtistsTable::def(),
        UsersTable::def(),
        TimeTable::def(),
        SongplaysTable::def(),
    ]
}

fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
}

fn strings<'a, T: 'a>(
    rows: &'a [T],
    get: impl Fn(&'a T) -> Option<&'a str>,
) -> ArrayRef {
    Arc::new(rows.iter().map(get).collect::<StringArray>())
}

// ============================================================================
// Songs
// ============================================================================

/// Songs dimension, partitioned by year and artist
pub struct SongsTable;

impl Table for SongsTable {
    type Row = SongRow;
    const NAME: &'static str = "songs";
    const PARTITION_BY: &'static [&'static str] = &["year", "artist_id"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("year", DataType::Int64, true),
            Field::new("duration", DataType::Float64, true),
        ]))
    }

    fn columns(rows: &[SongRow]) -> Vec<ArrayRef> {
        vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.song_id.as_str()),
            )),
            strings(rows, |r| r.title.as_deref()),
            strings(rows, |r| r.artist_id.as_deref()),
            Arc::new(rows.iter().map(|r| r.year).collect::<Int64Array>()),
            Arc::new(rows.iter().map(|r| r.duration).collect::<Float64Array>()),
        ]
    }
}

// ============================================================================
// Artists
// ============================================================================

/// Artists dimension, unpartitioned
pub struct ArtistsTable;

impl Table for ArtistsTable {
    type Row = ArtistRow;
    const NAME: &'static str = "artists";

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn columns(rows: &[ArtistRow]) -> Vec<ArrayRef> {
        vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.artist_id.as_str()),
            )),
            strings(rows, |r| r.name.as_deref()),
            strings(rows, |r| r.location.as_deref()),
            Arc::new(rows.iter().map(|r| r.latitude).collect::<Float64Array>()),
            Arc::new(rows.iter().map(|r| r.longitude).collect::<Float64Array>()),
        ]
    }
}

// ============================================================================
// Users
// ============================================================================

/// Users dimension, unpartitioned
pub struct UsersTable;

impl Table for UsersTable {
    type Row = UserRow;
    const NAME: &'static str = "users";

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("userId", DataType::Utf8, false),
            Field::new("firstName", DataType::Utf8, true),
            Field::new("lastName", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]))
    }

    fn columns(rows: &[UserRow]) -> Vec<ArrayRef> {
        vec![
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.user_id.as_str()),
            )),
            strings(rows, |r| r.first_name.as_deref()),
            strings(rows, |r| r.last_name.as_deref()),
            strings(rows, |r| r.gender.as_deref()),
            strings(rows, |r| r.level.as_deref()),
        ]
    }
}

// ============================================================================
// Time
// ============================================================================

/// Time dimension, partitioned by year and month
pub struct TimeTable;

impl Table for TimeTable {
    type Row = TimeRow;
    const NAME: &'static str = "time";
    const PARTITION_BY: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("start_time", timestamp_type(), false),
            Field::new("hour", DataType::Int32, true),
            Field::new("day", DataType::Int32, true),
            Field::new("week", DataType::Int32, true),
            Field::new("month", DataType::Int32, true),
            Field::new("year", DataType::Int32, true),
            Field::new("weekday", DataType::Int32, true),
        ]))
    }

    fn columns(rows: &[TimeRow]) -> Vec<ArrayRef> {
        let ints = |get: fn(&TimeRow) -> i32| -> ArrayRef {
            Arc::new(Int32Array::from_iter_values(rows.iter().map(get)))
        };
        vec![
            Arc::new(
                TimestampMillisecondArray::from_iter_values(
                    rows.iter().map(|r| r.start_time.timestamp_millis()),
                )
                .with_timezone("UTC"),
            ),
            ints(|r| r.hour),
            ints(|r| r.day),
            ints(|r| r.week),
            ints(|r| r.month),
            ints(|r| r.year),
            ints(|r| r.weekday),
        ]
    }
}

// ============================================================================
// Songplays
// ============================================================================

/// Songplays fact table, partitioned by year and month
pub struct SongplaysTable;

impl Table for SongplaysTable {
    type Row = SongplayRow;
    const NAME: &'static str = "songplays";
    const PARTITION_BY: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            Field::new("start_time", timestamp_type(), true),
            Field::new("year", DataType::Int32, true),
            Field::new("month", DataType::Int32, true),
            Field::new("userId", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, true),
            Field::new("sessionId", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("userAgent", DataType::Utf8, true),
        ]))
    }

    fn columns(rows: &[SongplayRow]) -> Vec<ArrayRef> {
        vec![
            Arc::new(Int64Array::from_iter_values(
                rows.iter().map(|r| r.songplay_id),
            )),
            Arc::new(
                rows.iter()
                    .map(|r| r.start_time.map(|t| t.timestamp_millis()))
                    .collect::<TimestampMillisecondArray>()
                    .with_timezone("UTC"),
            ),
            Arc::new(rows.iter().map(|r| r.year).collect::<Int32Array>()),
            Arc::new(rows.iter().map(|r| r.month).collect::<Int32Array>()),
            strings(rows, |r| r.user_id.as_deref()),
            strings(rows, |r| r.level.as_deref()),
            strings(rows, |r| r.song_id.as_deref()),
            strings(rows, |r| r.artist_id.as_deref()),
            Arc::new(rows.iter().map(|r| r.session_id).collect::<Int64Array>()),
            strings(rows, |r| r.location.as_deref()),
            strings(rows, |r| r.user_agent.as_deref()),
        ]
    }
}
