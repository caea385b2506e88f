//! Job session
//!
//! A [`Session`] is the explicit handle every stage receives: the input and
//! output locations plus the job configuration. Nothing is process-global.

use crate::config::JobConfig;
use crate::decode::JsonlDecoder;
use crate::error::{Result, ResultExt};
use crate::output::ParquetWriterConfig;
use crate::records::{LogRecord, SongRecord};
use crate::storage::{GlobPattern, StorageLocation};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Records read from one input glob
#[derive(Debug, Clone)]
pub struct SourceData<T> {
    /// Records in file path order, then line order
    pub records: Vec<T>,
    /// Files matched by the glob
    pub files: usize,
    /// Lines replaced by empty records (permissive mode)
    pub malformed: usize,
}

impl<T> Default for SourceData<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            files: 0,
            malformed: 0,
        }
    }
}

impl<T> SourceData<T> {
    fn map<U>(self, f: impl Fn(T) -> U) -> SourceData<U> {
        SourceData {
            records: self.records.into_iter().map(f).collect(),
            files: self.files,
            malformed: self.malformed,
        }
    }
}

/// Handle passed into each stage of the job
#[derive(Debug, Clone)]
pub struct Session {
    input: StorageLocation,
    output: StorageLocation,
    config: JobConfig,
}

impl Session {
    /// Validate the config and open its input and output locations
    pub fn bootstrap(config: JobConfig) -> Result<Self> {
        config.validate()?;

        let input = StorageLocation::parse(&config.input, &config.credentials, false)
            .with_context(|| format!("Failed to open input '{}'", config.input))?;
        let output = StorageLocation::parse(&config.output, &config.credentials, true)
            .with_context(|| format!("Failed to open output '{}'", config.output))?;

        info!(
            input = %config.input,
            output = %config.output,
            read_mode = %config.read_mode,
            "Session started"
        );
        Ok(Self::new(input, output, config))
    }

    /// Build a session over already-opened locations
    pub fn new(input: StorageLocation, output: StorageLocation, config: JobConfig) -> Self {
        Self {
            input,
            output,
            config,
        }
    }

    /// Input root
    pub fn input(&self) -> &StorageLocation {
        &self.input
    }

    /// Output root
    pub fn output(&self) -> &StorageLocation {
        &self.output
    }

    /// Job configuration
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Parquet settings for the output tables
    pub fn writer_config(&self) -> ParquetWriterConfig {
        self.config.parquet.writer_config()
    }

    /// Read every song metadata file under the song glob
    pub async fn read_song_records(&self) -> Result<SourceData<SongRecord>> {
        let pattern = self.config.song_pattern()?;
        let raw = self.read_json(&pattern).await?;
        Ok(raw.map(|value| SongRecord::from_json(&value)))
    }

    /// Read every event log file under the log glob
    pub async fn read_log_records(&self) -> Result<SourceData<LogRecord>> {
        let pattern = self.config.log_pattern()?;
        let raw = self.read_json(&pattern).await?;
        Ok(raw.map(|value| LogRecord::from_json(&value)))
    }

    async fn read_json(&self, pattern: &GlobPattern) -> Result<SourceData<Value>> {
        let files = self.input.list_matching(pattern).await?;
        if files.is_empty() {
            warn!(
                pattern = pattern.as_str(),
                root = %self.input.display_path(""),
                "No input files matched"
            );
            return Ok(SourceData::default());
        }

        let decoder = JsonlDecoder::new(self.config.read_mode);
        let mut data = SourceData {
            files: files.len(),
            ..SourceData::default()
        };
        for path in &files {
            let body = self.input.get(path).await?;
            let decoded = decoder.decode_bytes(path, &body)?;
            debug!(path = %path, records = decoded.records.len(), "Read input file");
            data.malformed += decoded.malformed;
            data.records.extend(decoded.records);
        }

        info!(
            pattern = pattern.as_str(),
            files = data.files,
            records = data.records.len(),
            malformed = data.malformed,
            "Read input"
        );
        Ok(data)
    }
}
