//! Tests for transform module

use super::*;
use crate::records::{LogRecord, SongRecord};
use crate::tables::{SongRow, UserRow};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn song(song_id: &str, title: &str, artist_id: &str, artist_name: &str) -> SongRecord {
    SongRecord {
        song_id: Some(song_id.to_string()),
        title: Some(title.to_string()),
        artist_id: Some(artist_id.to_string()),
        year: Some(2004),
        duration: Some(215.5),
        artist_name: Some(artist_name.to_string()),
        ..SongRecord::default()
    }
}

fn play(user_id: &str, level: &str, ts: i64, artist: &str, title: &str) -> LogRecord {
    LogRecord {
        user_id: Some(user_id.to_string()),
        first_name: Some(format!("First{user_id}")),
        last_name: Some(format!("Last{user_id}")),
        gender: Some("F".to_string()),
        level: Some(level.to_string()),
        ts: Some(ts),
        page: Some(NEXT_SONG_PAGE.to_string()),
        artist: Some(artist.to_string()),
        song: Some(title.to_string()),
        session_id: Some(100),
        location: Some("Tampa-St. Petersburg-Clearwater, FL".to_string()),
        user_agent: Some("Mozilla/5.0".to_string()),
    }
}

fn with_page(mut event: LogRecord, page: &str) -> LogRecord {
    event.page = Some(page.to_string());
    event
}

// ============================================================================
// Songs / Artists Tests
// ============================================================================

#[test]
fn test_extract_songs_first_record_wins() {
    let mut duplicate = song("SO1", "Second Copy", "AR9", "Someone");
    duplicate.year = Some(1999);
    let records = vec![
        song("SO2", "Beta", "AR2", "B"),
        song("SO1", "First Copy", "AR1", "A"),
        duplicate,
    ];

    let songs = extract_songs(&records);
    assert_eq!(
        songs,
        vec![
            SongRow {
                song_id: "SO1".to_string(),
                title: Some("First Copy".to_string()),
                artist_id: Some("AR1".to_string()),
                year: Some(2004),
                duration: Some(215.5),
            },
            SongRow {
                song_id: "SO2".to_string(),
                title: Some("Beta".to_string()),
                artist_id: Some("AR2".to_string()),
                year: Some(2004),
                duration: Some(215.5),
            },
        ]
    );
}

#[test]
fn test_extract_songs_skips_absent_keys() {
    let blank = song("  ", "Blank", "AR1", "A");
    let missing = SongRecord {
        title: Some("No id".to_string()),
        ..SongRecord::default()
    };
    let records = vec![blank, missing, song("SO1", "Kept", "AR1", "A")];

    let songs = extract_songs(&records);
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].song_id, "SO1");
}

#[test]
fn test_extract_artists_renames_and_dedups() {
    let mut first = song("SO1", "One", "AR1", "Elena");
    first.artist_location = Some("Dubai UAE".to_string());
    first.artist_latitude = Some(25.2);
    first.artist_longitude = Some(55.3);
    let mut second = song("SO2", "Two", "AR1", "Elena (dup)");
    second.artist_location = None;
    let records = vec![first, second, song("SO3", "Three", "AR0", "Zed")];

    let artists = extract_artists(&records);
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[0].artist_id, "AR0");
    assert_eq!(artists[1].artist_id, "AR1");
    assert_eq!(artists[1].name.as_deref(), Some("Elena"));
    assert_eq!(artists[1].location.as_deref(), Some("Dubai UAE"));
    assert_eq!(artists[1].latitude, Some(25.2));
    assert_eq!(artists[1].longitude, Some(55.3));
}

#[test]
fn test_empty_song_input() {
    assert!(extract_songs(&[]).is_empty());
    assert!(extract_artists(&[]).is_empty());
}

// ============================================================================
// Filter Tests
// ============================================================================

#[test]
fn test_filter_play_events() {
    let records = vec![
        play("1", "free", 1, "A", "a"),
        with_page(play("2", "free", 2, "A", "a"), "Home"),
        with_page(play("3", "free", 3, "A", "a"), "nextsong"),
        LogRecord::default(),
        play("4", "paid", 4, "A", "a"),
    ];

    let events = filter_play_events(&records);
    assert_eq!(events.len(), 2);
    let users: Vec<&str> = events
        .iter()
        .map(|e| e.user_id.as_deref().unwrap())
        .collect();
    assert_eq!(users, vec!["1", "4"]);
}

// ============================================================================
// Users Tests
// ============================================================================

#[test]
fn test_extract_users_latest_event_wins() {
    let records = vec![
        play("15", "paid", 3_000, "A", "a"),
        play("15", "free", 1_000, "A", "a"),
        play("8", "free", 5_000, "A", "a"),
    ];

    let users = extract_users(&filter_play_events(&records));
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].user_id, "15");
    assert_eq!(users[0].level.as_deref(), Some("paid"));
    assert_eq!(users[1].user_id, "8");
}

#[test]
fn test_extract_users_equal_ts_later_record_wins() {
    let records = vec![
        play("15", "free", 3_000, "A", "a"),
        play("15", "paid", 3_000, "A", "a"),
    ];
    let users = extract_users(&filter_play_events(&records));
    assert_eq!(users[0].level.as_deref(), Some("paid"));
}

#[test]
fn test_extract_users_absent_ts_loses_to_known_ts() {
    let mut undated = play("15", "free", 0, "A", "a");
    undated.ts = None;
    let records = vec![play("15", "paid", 3_000, "A", "a"), undated];
    let users = extract_users(&filter_play_events(&records));
    assert_eq!(users[0].level.as_deref(), Some("paid"));
}

#[test]
fn test_extract_users_ignores_non_play_and_logged_out() {
    let mut logged_out = play("", "free", 1, "A", "a");
    logged_out.first_name = None;
    let records = vec![
        with_page(play("99", "paid", 1, "A", "a"), "Login"),
        logged_out,
        play("26", "free", 2, "A", "a"),
    ];

    let users = extract_users(&filter_play_events(&records));
    assert_eq!(
        users,
        vec![UserRow {
            user_id: "26".to_string(),
            first_name: Some("First26".to_string()),
            last_name: Some("Last26".to_string()),
            gender: Some("F".to_string()),
            level: Some("free".to_string()),
        }]
    );
}

// ============================================================================
// Time Tests
// ============================================================================

#[test]
fn test_derive_start_time_keeps_millis() {
    let start = derive_start_time(1_541_440_293_796).unwrap();
    assert_eq!(
        start,
        Utc.with_ymd_and_hms(2018, 11, 5, 17, 51, 33).unwrap()
            + chrono::Duration::milliseconds(796)
    );
    assert_eq!(start.to_rfc3339(), "2018-11-05T17:51:33.796+00:00");
}

#[test]
fn test_derive_start_time_out_of_range() {
    assert!(derive_start_time(i64::MAX).is_none());
}

#[test]
fn test_extract_time_distinct_and_sorted() {
    let mut undated = play("3", "free", 0, "A", "a");
    undated.ts = None;
    let records = vec![
        play("1", "free", 1_541_440_293_796, "A", "a"),
        play("2", "free", 1_541_106_106_796, "A", "a"),
        play("3", "paid", 1_541_440_293_796, "B", "b"),
        with_page(play("4", "free", 1_500_000_000_000, "A", "a"), "Home"),
        undated,
    ];

    let time = extract_time(&filter_play_events(&records));
    assert_eq!(time.len(), 2);
    assert_eq!(time[0].start_time.timestamp_millis(), 1_541_106_106_796);
    assert_eq!(time[1].start_time.timestamp_millis(), 1_541_440_293_796);
    assert_eq!((time[1].year, time[1].month, time[1].day), (2018, 11, 5));
    assert_eq!((time[1].hour, time[1].week, time[1].weekday), (17, 45, 2));
}

// ============================================================================
// Songplays Tests
// ============================================================================

#[test]
fn test_songplays_join_by_artist_name() {
    let songs = vec![
        song("SOELENA", "Setarehye Man", "AR_ELENA", "Elena"),
        song("SOOTHER", "Other", "AR_OTHER", "Someone Else"),
    ];
    let records = vec![
        play("10", "free", 1_541_440_293_796, "Elena", "Anything"),
        play("11", "free", 1_541_440_293_800, "Unknown Artist", "Nope"),
    ];

    let plays = extract_songplays(&filter_play_events(&records), &songs, &ArtistNameKey);
    assert_eq!(plays.len(), 1);
    let row = &plays[0];
    assert_eq!(row.song_id.as_deref(), Some("SOELENA"));
    assert_eq!(row.artist_id.as_deref(), Some("AR_ELENA"));
    assert_eq!(row.user_id.as_deref(), Some("10"));
    assert_eq!(row.level.as_deref(), Some("free"));
    assert_eq!(row.session_id, Some(100));
    assert_eq!((row.year, row.month), (Some(2018), Some(11)));
    assert_eq!(
        row.start_time.map(|t| t.timestamp_millis()),
        Some(1_541_440_293_796)
    );
}

#[test]
fn test_songplays_exclude_non_play_events() {
    let songs = vec![song("SO1", "One", "AR1", "Elena")];
    let records = vec![
        with_page(play("1", "free", 1_000, "Elena", "One"), "Home"),
        with_page(play("2", "free", 2_000, "Elena", "One"), "Logout"),
    ];

    let plays = extract_songplays(&filter_play_events(&records), &songs, &ArtistNameKey);
    assert!(plays.is_empty());
}

#[test]
fn test_songplays_absent_artist_never_matches() {
    let mut nameless = song("SO1", "One", "AR1", "x");
    nameless.artist_name = None;
    let mut silent = play("1", "free", 1_000, "x", "One");
    silent.artist = None;

    let plays = extract_songplays(
        &filter_play_events(&[silent]),
        &[nameless],
        &ArtistNameKey,
    );
    assert!(plays.is_empty());
}

#[test]
fn test_songplays_fan_out_on_shared_artist_name() {
    let songs = vec![
        song("SO1", "One", "AR1", "Elena"),
        song("SO2", "Two", "AR2", "Elena"),
        // duplicate song record does not add a second row
        song("SO1", "One (dup)", "AR1", "Elena"),
    ];
    let records = vec![play("1", "free", 1_000, "Elena", "Two")];

    let plays = extract_songplays(&filter_play_events(&records), &songs, &ArtistNameKey);
    let ids: Vec<&str> = plays
        .iter()
        .map(|p| p.song_id.as_deref().unwrap())
        .collect();
    assert_eq!(ids, vec!["SO1", "SO2"]);

    let narrowed = extract_songplays(&filter_play_events(&records), &songs, &ArtistTitleKey);
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].song_id.as_deref(), Some("SO2"));
}

#[test]
fn test_songplay_ids_increase_per_partition() {
    let songs = vec![song("SO1", "One", "AR1", "Elena")];
    // 2018-11-05, 2018-12-01, 2018-11-01 (out of order on purpose)
    let records = vec![
        play("2", "free", 1_541_440_293_796, "Elena", "One"),
        play("3", "free", 1_543_622_400_000, "Elena", "One"),
        play("1", "free", 1_541_030_400_000, "Elena", "One"),
    ];

    let plays = extract_songplays(&filter_play_events(&records), &songs, &ArtistNameKey);
    let got: Vec<(Option<i32>, Option<String>, i64)> = plays
        .iter()
        .map(|p| (p.month, p.user_id.clone(), p.songplay_id))
        .collect();
    assert_eq!(
        got,
        vec![
            (Some(11), Some("1".to_string()), songplay_id(0, 0)),
            (Some(11), Some("2".to_string()), songplay_id(0, 1)),
            (Some(12), Some("3".to_string()), songplay_id(1, 0)),
        ]
    );
    assert!(songplay_id(1, 0) > songplay_id(0, 1));
}

#[test]
fn test_songplays_undated_event_kept_without_partition_values() {
    let songs = vec![song("SO1", "One", "AR1", "Elena")];
    let mut undated = play("1", "free", 0, "Elena", "One");
    undated.ts = None;

    let plays = extract_songplays(&filter_play_events(&[undated]), &songs, &ArtistNameKey);
    assert_eq!(plays.len(), 1);
    assert_eq!((plays[0].year, plays[0].month, plays[0].start_time), (None, None, None));
}

#[test]
fn test_join_key_kind() {
    assert_eq!(JoinKeyKind::default(), JoinKeyKind::ArtistName);
    assert_eq!(JoinKeyKind::ArtistName.key().name(), "artist_name");
    assert_eq!(JoinKeyKind::ArtistTitle.key().name(), "artist_title");
}
