//! Pipeline types
//!
//! Stage selection and run statistics.

use crate::output::WriteSummary;

/// Which stages a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Stages {
    /// Song stage, then log stage
    #[default]
    All,
    /// songs and artists only
    Songs,
    /// users, time and songplays only
    Logs,
}

impl Stages {
    /// Whether the song stage runs
    pub fn songs(self) -> bool {
        matches!(self, Stages::All | Stages::Songs)
    }

    /// Whether the log stage runs
    pub fn logs(self) -> bool {
        matches!(self, Stages::All | Stages::Logs)
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Song files read (counted once per read)
    pub song_files: usize,
    /// Song records read
    pub song_records: usize,
    /// Log files read
    pub log_files: usize,
    /// Log records read
    pub log_records: usize,
    /// Log records with `page == "NextSong"`
    pub play_events: usize,
    /// Input lines replaced by empty records
    pub malformed: usize,
    /// One entry per table written, in write order
    pub tables: Vec<WriteSummary>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished table write
    pub fn add_table(&mut self, summary: WriteSummary) {
        self.tables.push(summary);
    }

    /// Summary for one table, if it was written
    pub fn table(&self, name: &str) -> Option<&WriteSummary> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// Rows written across all tables
    pub fn rows_written(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// Data files written across all tables
    pub fn files_written(&self) -> usize {
        self.tables.iter().map(|t| t.files).sum()
    }

    /// Fold the stats of a later stage into these
    pub fn merge(&mut self, other: RunStats) {
        self.song_files += other.song_files;
        self.song_records += other.song_records;
        self.log_files += other.log_files;
        self.log_records += other.log_records;
        self.play_events += other.play_events;
        self.malformed += other.malformed;
        self.tables.extend(other.tables);
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
