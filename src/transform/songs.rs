//! Song path: songs and artists dimensions

use super::key_of;
use crate::records::SongRecord;
use crate::tables::{ArtistRow, SongRow};
use std::collections::BTreeMap;

/// One representative per `song_id`: the first record in input order
///
/// Records without a usable `song_id` are skipped. The result is sorted by
/// `song_id`.
pub fn distinct_songs(records: &[SongRecord]) -> Vec<&SongRecord> {
    let mut by_id: BTreeMap<&str, &SongRecord> = BTreeMap::new();
    for record in records {
        if let Some(id) = key_of(&record.song_id) {
            by_id.entry(id).or_insert(record);
        }
    }
    by_id.into_values().collect()
}

/// Songs dimension: one row per `song_id`, first record wins
pub fn extract_songs(records: &[SongRecord]) -> Vec<SongRow> {
    distinct_songs(records)
        .into_iter()
        .filter_map(|record| {
            Some(SongRow {
                song_id: record.song_id.clone()?,
                title: record.title.clone(),
                artist_id: record.artist_id.clone(),
                year: record.year,
                duration: record.duration,
            })
        })
        .collect()
}

/// Artists dimension: one row per `artist_id`, first record wins
pub fn extract_artists(records: &[SongRecord]) -> Vec<ArtistRow> {
    let mut by_id: BTreeMap<&str, &SongRecord> = BTreeMap::new();
    for record in records {
        if let Some(id) = key_of(&record.artist_id) {
            by_id.entry(id).or_insert(record);
        }
    }

    by_id
        .into_iter()
        .map(|(id, record)| ArtistRow {
            artist_id: id.to_string(),
            name: record.artist_name.clone(),
            location: record.artist_location.clone(),
            latitude: record.artist_latitude,
            longitude: record.artist_longitude,
        })
        .collect()
}
