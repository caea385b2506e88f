//! Song and log record types

use super::fields::{float_field, int_field, string_field};
use serde_json::Value;

/// One song metadata record (`song_data/*/*/*/*.json`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongRecord {
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i64>,
    pub duration: Option<f64>,
    pub artist_name: Option<String>,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

impl SongRecord {
    /// Read a song record from a decoded JSON object
    pub fn from_json(record: &Value) -> Self {
        Self {
            song_id: string_field(record, "song_id"),
            title: string_field(record, "title"),
            artist_id: string_field(record, "artist_id"),
            year: int_field(record, "year"),
            duration: float_field(record, "duration"),
            artist_name: string_field(record, "artist_name"),
            artist_location: string_field(record, "artist_location"),
            artist_latitude: float_field(record, "artist_latitude"),
            artist_longitude: float_field(record, "artist_longitude"),
        }
    }
}

/// One user activity event (`log-data/*/*/*.json`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    /// Event time, milliseconds since the Unix epoch
    pub ts: Option<i64>,
    pub page: Option<String>,
    pub artist: Option<String>,
    pub song: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl LogRecord {
    /// Read a log record from a decoded JSON object
    pub fn from_json(record: &Value) -> Self {
        Self {
            user_id: string_field(record, "userId"),
            first_name: string_field(record, "firstName"),
            last_name: string_field(record, "lastName"),
            gender: string_field(record, "gender"),
            level: string_field(record, "level"),
            ts: int_field(record, "ts"),
            page: string_field(record, "page"),
            artist: string_field(record, "artist"),
            song: string_field(record, "song"),
            session_id: int_field(record, "sessionId"),
            location: string_field(record, "location"),
            user_agent: string_field(record, "userAgent"),
        }
    }
}
