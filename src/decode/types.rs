//! Decoder types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How malformed input lines are handled
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// The first malformed line fails the whole read (default)
    #[default]
    #[value(name = "failfast")]
    FailFast,
    /// Malformed lines become empty records and the read continues
    Permissive,
}

impl std::fmt::Display for ReadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadMode::FailFast => write!(f, "failfast"),
            ReadMode::Permissive => write!(f, "permissive"),
        }
    }
}

/// Records decoded from one file
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    /// One JSON object per input record, in line order
    pub records: Vec<Value>,
    /// Lines replaced by empty records (permissive mode only)
    pub malformed: usize,
}
