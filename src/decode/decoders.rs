//! Decoder implementations

use super::types::{Decoded, ReadMode};
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use tracing::warn;

// ============================================================================
// JSONL Decoder
// ============================================================================

/// JSON Lines decoder (one JSON object per line)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlDecoder {
    mode: ReadMode,
}

impl JsonlDecoder {
    /// Create a new JSONL decoder
    pub fn new(mode: ReadMode) -> Self {
        Self { mode }
    }

    /// The configured read mode
    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    /// Decode raw file bytes; `source` names the file in errors and logs
    pub fn decode_bytes(&self, source: &str, body: &[u8]) -> Result<Decoded> {
        match std::str::from_utf8(body) {
            Ok(text) => self.decode(source, text),
            Err(e) => match self.mode {
                ReadMode::FailFast => Err(Error::malformed(source, 0, format!("invalid UTF-8: {e}"))),
                ReadMode::Permissive => {
                    warn!(source, "File is not valid UTF-8, replacing invalid bytes");
                    self.decode(source, &String::from_utf8_lossy(body))
                }
            },
        }
    }

    /// Decode a file body
    pub fn decode(&self, source: &str, body: &str) -> Result<Decoded> {
        let mut decoded = Decoded::default();

        for (line_num, line) in body.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_object(line) {
                Ok(value) => decoded.records.push(value),
                Err(message) => match self.mode {
                    ReadMode::FailFast => {
                        return Err(Error::malformed(source, line_num + 1, message));
                    }
                    ReadMode::Permissive => {
                        warn!(
                            source,
                            line = line_num + 1,
                            error = %message,
                            "Malformed record read as empty"
                        );
                        decoded.records.push(Value::Object(Map::new()));
                        decoded.malformed += 1;
                    }
                },
            }
        }

        Ok(decoded)
    }
}

/// Parse one line, accepting only JSON objects
fn parse_object(line: &str) -> std::result::Result<Value, String> {
    match serde_json::from_str::<Value>(line) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!("expected a JSON object, found {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
