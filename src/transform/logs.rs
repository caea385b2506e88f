//! Log path: users and time dimensions, songplays fact table

use super::join::JoinKey;
use super::songs::distinct_songs;
use super::time::{derive_start_time, songplay_id};
use super::key_of;
use crate::records::{LogRecord, SongRecord};
use crate::tables::{SongplayRow, TimeRow, UserRow};
use chrono::Datelike;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// `page` value of a song play event
pub const NEXT_SONG_PAGE: &str = "NextSong";

fn is_play_event(event: &LogRecord) -> bool {
    event.page.as_deref() == Some(NEXT_SONG_PAGE)
}

/// Log events known to be song plays
///
/// Only [`filter_play_events`] builds this, so every table derived from it
/// sees filtered events.
#[derive(Debug, Clone)]
pub struct PlayEvents<'a> {
    events: Vec<&'a LogRecord>,
}

impl<'a> PlayEvents<'a> {
    /// Number of play events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether there are no play events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in input order
    pub fn iter(&self) -> impl Iterator<Item = &'a LogRecord> + '_ {
        self.events.iter().copied()
    }
}

/// Keep only events whose `page` is exactly `NextSong`
pub fn filter_play_events(records: &[LogRecord]) -> PlayEvents<'_> {
    PlayEvents {
        events: records.iter().filter(|e| is_play_event(e)).collect(),
    }
}

/// Users dimension: one row per `userId`
///
/// The user's latest event (greatest `ts`) wins, so `level` is the most
/// recent subscription level. On equal or absent `ts` the later event in
/// input order wins. Events without a usable `userId` are skipped.
pub fn extract_users(events: &PlayEvents<'_>) -> Vec<UserRow> {
    let mut latest: BTreeMap<&str, &LogRecord> = BTreeMap::new();
    for event in events.iter() {
        let Some(user_id) = key_of(&event.user_id) else {
            continue;
        };
        match latest.entry(user_id) {
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
            Entry::Occupied(mut slot) => {
                if event.ts >= slot.get().ts {
                    slot.insert(event);
                }
            }
        }
    }

    latest
        .into_iter()
        .map(|(user_id, event)| UserRow {
            user_id: user_id.to_string(),
            first_name: event.first_name.clone(),
            last_name: event.last_name.clone(),
            gender: event.gender.clone(),
            level: event.level.clone(),
        })
        .collect()
}

/// Time dimension: one row per distinct `start_time`, in time order
pub fn extract_time(events: &PlayEvents<'_>) -> Vec<TimeRow> {
    events
        .iter()
        .filter_map(|event| event.ts.and_then(derive_start_time))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(TimeRow::from_start_time)
        .collect()
}

/// Songplays fact table
///
/// Inner join of play events against the distinct songs (one per
/// `song_id`) on `join_key`, with the `NextSong` predicate applied again.
/// Events matching no song produce no row; events matching several songs
/// produce one row per song.
///
/// Rows are ordered by (year, month, start_time, userId, sessionId,
/// song_id) and numbered per (year, month) partition with [`songplay_id`].
pub fn extract_songplays(
    events: &PlayEvents<'_>,
    songs: &[SongRecord],
    join_key: &dyn JoinKey,
) -> Vec<SongplayRow> {
    let mut index: HashMap<Vec<String>, Vec<&SongRecord>> = HashMap::new();
    for song in distinct_songs(songs) {
        if let Some(key) = join_key.song_key(song) {
            index.entry(key).or_default().push(song);
        }
    }

    let mut plays = Vec::new();
    for event in events.iter().filter(|e| is_play_event(e)) {
        let Some(matches) = join_key.log_key(event).and_then(|key| index.get(&key)) else {
            continue;
        };
        let start_time = event.ts.and_then(derive_start_time);
        for song in matches {
            plays.push(SongplayRow {
                songplay_id: 0,
                start_time,
                year: start_time.map(|t| t.year()),
                month: start_time.map(|t| t.month() as i32),
                user_id: event.user_id.clone(),
                level: event.level.clone(),
                song_id: song.song_id.clone(),
                artist_id: song.artist_id.clone(),
                session_id: event.session_id,
                location: event.location.clone(),
                user_agent: event.user_agent.clone(),
            });
        }
    }

    plays.sort_by(|a, b| {
        (a.year, a.month, a.start_time, &a.user_id, a.session_id, &a.song_id).cmp(&(
            b.year,
            b.month,
            b.start_time,
            &b.user_id,
            b.session_id,
            &b.song_id,
        ))
    });
    assign_songplay_ids(&mut plays);
    plays
}

/// Number sorted rows per (year, month) partition
fn assign_songplay_ids(plays: &mut [SongplayRow]) {
    let mut current: Option<(Option<i32>, Option<i32>)> = None;
    let mut partition = 0;
    let mut row = 0;
    for play in plays {
        let key = (play.year, play.month);
        if current != Some(key) {
            if current.is_some() {
                partition += 1;
            }
            current = Some(key);
            row = 0;
        }
        play.songplay_id = songplay_id(partition, row);
        row += 1;
    }
}
