//! Record decoder module
//!
//! Reads newline-delimited JSON, the layout of both the song metadata and
//! the event log files.
//!
//! # Overview
//!
//! Each non-blank line holds one JSON object. How a line that is not a JSON
//! object is treated depends on the [`ReadMode`].

mod decoders;
mod types;

pub use decoders::JsonlDecoder;
pub use types::{Decoded, ReadMode};
