//! Byte-level regex substitution for attribute values.

use anyhow::{Context, Result};
use regex::bytes::Regex;

/// A compiled pattern plus its replacement template.
///
/// Substitution is byte-oriented so attribute values that are not valid
/// UTF-8 pass through without re-encoding. The replacement template may
/// reference capture groups (`$1`, `${name}`).
#[derive(Debug, Clone)]
pub struct Rewrite {
    regex: Regex,
    replacement: Vec<u8>,
}

impl Rewrite {
    /// Compile the pattern/replacement pair. A malformed pattern is rejected
    /// here, before any record is processed.
    pub fn compile(pattern: &str, replacement: &[u8]) -> Result<Self> {
        let regex =
            Regex::new(pattern).with_context(|| format!("compile pattern {pattern:?}"))?;
        Ok(Self {
            regex,
            replacement: replacement.to_vec(),
        })
    }

    /// Replace every match in `value` in a single pass. When the pattern
    /// does not match anywhere the returned bytes equal the input exactly.
    pub fn substitute(&self, value: &[u8]) -> Vec<u8> {
        self.regex
            .replace_all(value, self.replacement.as_slice())
            .into_owned()
    }
}
