//! Pipeline module
//!
//! The two stages of the job and the run loop that sequences them.
//!
//! # Overview
//!
//! - [`process_song_data`] - songs and artists from song metadata
//! - [`process_log_data`] - users, time and songplays from event logs
//! - [`run`] - selected stages in fixed order, songs first
//!
//! Each table is built in full and handed to a [`TableSink`], which replaces
//! whatever the previous run left at that table's path. A run is not atomic:
//! a failure in the log stage leaves the song stage's tables written.

mod types;


pub use types::{RunStats, Stages};

use crate::error::{Result, ResultExt};
use crate::output::{TableSink, WriteSummary};
use crate::session::Session;
use crate::tables::{ArtistsTable, SongplaysTable, SongsTable, Table, TimeTable, UsersTable};
use crate::transform::{
    extract_artists, extract_songplays, extract_songs, extract_time, extract_users,
    filter_play_events,
};
use std::time::Instant;
use tracing::info;

async fn write_rows<T: Table>(sink: &dyn TableSink, rows: &[T::Row]) -> Result<WriteSummary> {
    let batch = T::to_batch(rows)?;
    sink.write_table(&T::def(), batch)
        .await
        .with_context(|| format!("Failed to write table '{}'", T::NAME))
}

/// Build and write the songs and artists tables
pub async fn process_song_data(session: &Session, sink: &dyn TableSink) -> Result<RunStats> {
    let mut stats = RunStats::new();
    let songs = session.read_song_records().await?;
    stats.song_files = songs.files;
    stats.song_records = songs.records.len();
    stats.malformed = songs.malformed;

    let song_rows = extract_songs(&songs.records);
    stats.add_table(write_rows::<SongsTable>(sink, &song_rows).await?);

    let artist_rows = extract_artists(&songs.records);
    stats.add_table(write_rows::<ArtistsTable>(sink, &artist_rows).await?);

    info!(
        songs = song_rows.len(),
        artists = artist_rows.len(),
        "Song stage complete"
    );
    Ok(stats)
}

/// Build and write the users, time and songplays tables
///
/// Song metadata is read again for the fact join; the song stage's output
/// tables are not an input.
pub async fn process_log_data(session: &Session, sink: &dyn TableSink) -> Result<RunStats> {
    let mut stats = RunStats::new();
    let logs = session.read_log_records().await?;
    stats.log_files = logs.files;
    stats.log_records = logs.records.len();
    stats.malformed = logs.malformed;

    let events = filter_play_events(&logs.records);
    stats.play_events = events.len();

    let user_rows = extract_users(&events);
    stats.add_table(write_rows::<UsersTable>(sink, &user_rows).await?);

    let time_rows = extract_time(&events);
    stats.add_table(write_rows::<TimeTable>(sink, &time_rows).await?);

    let songs = session.read_song_records().await?;
    stats.song_files = songs.files;
    stats.song_records = songs.records.len();
    stats.malformed += songs.malformed;

    let join_key = session.config().join_key.key();
    let songplay_rows = extract_songplays(&events, &songs.records, join_key.as_ref());
    stats.add_table(write_rows::<SongplaysTable>(sink, &songplay_rows).await?);

    info!(
        play_events = events.len(),
        users = user_rows.len(),
        time = time_rows.len(),
        songplays = songplay_rows.len(),
        join_key = join_key.name(),
        "Log stage complete"
    );
    Ok(stats)
}

/// Run the selected stages, songs before logs, stopping at the first error
pub async fn run(session: &Session, sink: &dyn TableSink, stages: Stages) -> Result<RunStats> {
    let start = Instant::now();
    let mut stats = RunStats::new();

    if stages.songs() {
        stats.merge(process_song_data(session, sink).await?);
    }
    if stages.logs() {
        stats.merge(process_log_data(session, sink).await?);
    }

    stats.set_duration(start.elapsed().as_millis() as u64);
    info!(
        tables = stats.tables.len(),
        rows = stats.rows_written(),
        files = stats.files_written(),
        duration_ms = stats.duration_ms,
        "Run complete"
    );
    Ok(stats)
}
