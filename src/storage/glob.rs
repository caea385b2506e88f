//! Path globs for selecting input files
//!
//! Supports `*` (any run of characters within one path segment) and `?`
//! (one character within a segment). Everything else matches literally.

use crate::error::{Error, Result};
use regex::Regex;

/// A compiled path glob such as `song_data/*/*/*/*.json`
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim_matches('/');
        if trimmed.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                message: "pattern is empty".to_string(),
            });
        }

        let mut expr = String::with_capacity(trimmed.len() * 2 + 2);
        expr.push('^');
        let mut literal = String::new();
        for ch in trimmed.chars() {
            match ch {
                '*' | '?' => {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                    expr.push_str(if ch == '*' { "[^/]*" } else { "[^/]" });
                }
                other => literal.push(other),
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            pattern: trimmed.to_string(),
            regex,
        })
    }

    /// The pattern text (without leading/trailing slashes)
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Leading path segments that contain no wildcard
    ///
    /// Used as the listing prefix so only the relevant subtree is scanned.
    pub fn literal_prefix(&self) -> String {
        self.pattern
            .split('/')
            .take_while(|segment| !segment.contains(['*', '?']))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Check a path relative to the storage root
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path.trim_start_matches('/'))
    }
}
