//! Transformation rules
//!
//! Pure functions from raw records to table rows. Nothing here performs I/O,
//! so every rule can be exercised with small in-memory fixtures.
//!
//! # Overview
//!
//! - Song path: [`extract_songs`], [`extract_artists`]
//! - Log path: [`filter_play_events`], then [`extract_users`],
//!   [`extract_time`] and [`extract_songplays`]
//! - [`JoinKey`] isolates the predicate matching log events to songs
//!
//! Dimension tables keep one row per key; rows whose key is absent or blank
//! are excluded. Outputs are sorted by key so reruns produce identical files.

mod join;
mod logs;
mod songs;
mod time;

pub use join::{ArtistNameKey, ArtistTitleKey, JoinKey, JoinKeyKind};
pub use logs::{
    extract_songplays, extract_time, extract_users, filter_play_events, PlayEvents,
    NEXT_SONG_PAGE,
};
pub use songs::{distinct_songs, extract_artists, extract_songs};
pub use time::{derive_start_time, songplay_id};

/// A usable key: present and not blank
fn key_of(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests;
