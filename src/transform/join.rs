//! Join predicate between log events and songs
//!
//! Events are matched to songs by artist name text, not by id: the logs
//! carry no artist or song ids. Matching is exact string equality, so
//! spelling differences drop plays and a shared name fans a play out to
//! every song of that name. An absent value never matches.

use crate::records::{LogRecord, SongRecord};
use serde::{Deserialize, Serialize};

/// Extracts comparable key parts from both sides of the fact join
pub trait JoinKey: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Key of a song, `None` if it cannot match anything
    fn song_key(&self, song: &SongRecord) -> Option<Vec<String>>;

    /// Key of a log event, `None` if it cannot match anything
    fn log_key(&self, event: &LogRecord) -> Option<Vec<String>>;
}

/// `log.artist == song.artist_name`
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtistNameKey;

impl JoinKey for ArtistNameKey {
    fn name(&self) -> &'static str {
        "artist_name"
    }

    fn song_key(&self, song: &SongRecord) -> Option<Vec<String>> {
        Some(vec![song.artist_name.clone()?])
    }

    fn log_key(&self, event: &LogRecord) -> Option<Vec<String>> {
        Some(vec![event.artist.clone()?])
    }
}

/// `log.artist == song.artist_name AND log.song == song.title`
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtistTitleKey;

impl JoinKey for ArtistTitleKey {
    fn name(&self) -> &'static str {
        "artist_title"
    }

    fn song_key(&self, song: &SongRecord) -> Option<Vec<String>> {
        Some(vec![song.artist_name.clone()?, song.title.clone()?])
    }

    fn log_key(&self, event: &LogRecord) -> Option<Vec<String>> {
        Some(vec![event.artist.clone()?, event.song.clone()?])
    }
}

/// Configurable choice of join key
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum JoinKeyKind {
    /// Artist name only
    #[default]
    #[value(name = "artist_name")]
    ArtistName,
    /// Artist name and song title
    #[value(name = "artist_title")]
    ArtistTitle,
}

impl JoinKeyKind {
    /// The key implementation
    pub fn key(self) -> Box<dyn JoinKey> {
        match self {
            JoinKeyKind::ArtistName => Box::new(ArtistNameKey),
            JoinKeyKind::ArtistTitle => Box::new(ArtistTitleKey),
        }
    }
}
