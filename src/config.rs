//! Job configuration
//!
//! The job is configured from a YAML file, the environment and CLI flags,
//! in increasing order of precedence. Every section has defaults so an empty
//! file is a valid configuration.
//!
//! ```yaml
//! input: s3a://udacity-dend/
//! output: s3a://my-lake/
//! credentials:
//!   access_key_id: AKIA...
//!   secret_access_key: ...
//!   region: us-west-2
//! read_mode: failfast
//! join_key: artist_name
//! parquet:
//!   compression: snappy
//! ```

use crate::decode::ReadMode;
use crate::error::{Error, Result};
use crate::output::{CompressionKind, ParquetWriterConfig};
use crate::storage::GlobPattern;
use crate::transform::JoinKeyKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default input root (public song/log dataset)
pub const DEFAULT_INPUT: &str = "s3a://udacity-dend/";

/// Default output root
pub const DEFAULT_OUTPUT: &str = "output";

/// Default glob for song metadata files, relative to the input root
pub const DEFAULT_SONG_GLOB: &str = "song_data/*/*/*/*.json";

/// Default glob for event log files, relative to the input root
pub const DEFAULT_LOG_GLOB: &str = "log-data/*/*/*.json";

// ============================================================================
// Top-Level Job Config
// ============================================================================

/// Complete job configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobConfig {
    /// Input root URL
    #[serde(default = "default_input")]
    pub input: String,

    /// Output root URL
    #[serde(default = "default_output")]
    pub output: String,

    /// Storage credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// How malformed JSON lines are handled
    #[serde(default)]
    pub read_mode: ReadMode,

    /// Join predicate between log events and songs
    #[serde(default)]
    pub join_key: JoinKeyKind,

    /// Song metadata glob
    #[serde(default = "default_song_glob")]
    pub song_glob: String,

    /// Event log glob
    #[serde(default = "default_log_glob")]
    pub log_glob: String,

    /// Parquet writer settings
    #[serde(default)]
    pub parquet: ParquetSettings,
}

fn default_input() -> String {
    DEFAULT_INPUT.to_string()
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_song_glob() -> String {
    DEFAULT_SONG_GLOB.to_string()
}

fn default_log_glob() -> String {
    DEFAULT_LOG_GLOB.to_string()
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            credentials: Credentials::default(),
            read_mode: ReadMode::default(),
            join_key: JoinKeyKind::default(),
            song_glob: default_song_glob(),
            log_glob: default_log_glob(),
            parquet: ParquetSettings::default(),
        }
    }
}

impl JobConfig {
    /// Parse a config from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Fill credentials missing from the file with `AWS_*` environment variables
    #[must_use]
    pub fn with_env(mut self) -> Self {
        self.credentials = self
            .credentials
            .or_else(|name| std::env::var(name).ok());
        self
    }

    /// Compiled song glob
    pub fn song_pattern(&self) -> Result<GlobPattern> {
        GlobPattern::new(&self.song_glob)
    }

    /// Compiled log glob
    pub fn log_pattern(&self) -> Result<GlobPattern> {
        GlobPattern::new(&self.log_glob)
    }

    /// Check the config for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(Error::invalid_value("input", "must not be empty"));
        }
        if self.output.trim().is_empty() {
            return Err(Error::invalid_value("output", "must not be empty"));
        }
        if self.input.trim_end_matches('/') == self.output.trim_end_matches('/') {
            return Err(Error::invalid_value(
                "output",
                "must differ from input; tables would overwrite raw data",
            ));
        }
        self.song_pattern()?;
        self.log_pattern()?;
        self.credentials.validate()?;
        self.parquet.validate()?;
        Ok(())
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Storage credentials for S3-compatible locations
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    /// Access key id
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Secret access key
    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Region (e.g. us-west-2)
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint (R2, MinIO, localstack)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Credentials {
    /// Fill missing values from a variable lookup (`AWS_*` names)
    #[must_use]
    pub fn or_else(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            access_key_id: self
                .access_key_id
                .or_else(|| lookup("AWS_ACCESS_KEY_ID")),
            secret_access_key: self
                .secret_access_key
                .or_else(|| lookup("AWS_SECRET_ACCESS_KEY")),
            region: self.region.or_else(|| lookup("AWS_DEFAULT_REGION")),
            endpoint: self.endpoint.or_else(|| lookup("AWS_ENDPOINT")),
        }
    }

    /// Key id and secret must be given together
    pub fn validate(&self) -> Result<()> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(_), None) => Err(Error::invalid_value(
                "credentials.secret_access_key",
                "required when access_key_id is set",
            )),
            (None, Some(_)) => Err(Error::invalid_value(
                "credentials.access_key_id",
                "required when secret_access_key is set",
            )),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Parquet Settings
// ============================================================================

/// Parquet writer settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParquetSettings {
    /// Compression codec
    #[serde(default)]
    pub compression: CompressionKind,

    /// Maximum rows per row group
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,

    /// Dictionary encoding
    #[serde(default = "default_true")]
    pub dictionary: bool,

    /// Column statistics
    #[serde(default = "default_true")]
    pub statistics: bool,
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for ParquetSettings {
    fn default() -> Self {
        Self {
            compression: CompressionKind::default(),
            row_group_size: default_row_group_size(),
            dictionary: true,
            statistics: true,
        }
    }
}

impl ParquetSettings {
    fn validate(&self) -> Result<()> {
        if self.row_group_size == 0 {
            return Err(Error::invalid_value(
                "parquet.row_group_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Build the writer config
    pub fn writer_config(&self) -> ParquetWriterConfig {
        ParquetWriterConfig::new()
            .with_compression(self.compression)
            .with_row_group_size(self.row_group_size)
            .with_dictionary(self.dictionary)
            .with_statistics(self.statistics)
    }
}
