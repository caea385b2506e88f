//! Table row types

use chrono::{DateTime, Datelike, Timelike, Utc};

/// One row of the songs dimension
#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub year: Option<i64>,
    pub duration: Option<f64>,
}

/// One row of the artists dimension
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One row of the users dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

/// One row of the time dimension
///
/// Every field but `start_time` is a function of `start_time`, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeRow {
    pub start_time: DateTime<Utc>,
    pub hour: i32,
    /// Day of month, 1-31
    pub day: i32,
    /// ISO 8601 week of year, 1-53
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// Day of week, 1 = Sunday through 7 = Saturday
    pub weekday: i32,
}

impl TimeRow {
    /// Break a timestamp into its calendar fields
    pub fn from_start_time(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            hour: start_time.hour() as i32,
            day: start_time.day() as i32,
            week: start_time.iso_week().week() as i32,
            month: start_time.month() as i32,
            year: start_time.year(),
            weekday: start_time.weekday().number_from_sunday() as i32,
        }
    }
}

/// One row of the songplays fact table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongplayRow {
    /// Surrogate id, unique within one run only
    pub songplay_id: i64,
    pub start_time: Option<DateTime<Utc>>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}
