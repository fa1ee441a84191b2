// src/bag/info.rs

//! Package header (`bag-info.txt`)
//!
//! The header is a UTF-8 `Key: Value` file. Key order is preserved across a
//! load/save round trip so repair rewrites stay reviewable in diffs. The
//! `Payload-Oxum` key declares the payload summary as
//! `<fileCount>.<totalBytes>`; repair operations add audit keys recording the
//! most recent update.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use thiserror::Error;

/// Header filename inside the package root
pub const INFO_FILE: &str = "bag-info.txt";

/// Key holding the declared payload summary
pub const PAYLOAD_OXUM: &str = "Payload-Oxum";

/// Audit key: timestamp of the most recent repair write
pub const UPDATE_DATE_KEY: &str = "Most-Recent-Update-Date";

/// Audit key: free-text reason for the most recent repair write
pub const UPDATE_MESSAGE_KEY: &str = "Most-Recent-Update-Message";

/// Audit message used when the caller does not supply one
pub const DEFAULT_UPDATE_MESSAGE: &str = "Declared payload summary reconciled with payload state";

/// Header parse errors
#[derive(Debug, Error)]
pub enum InfoError {
    #[error("package header {INFO_FILE} is missing")]
    MissingHeader,

    #[error("header line {line} is not a `Key: Value` pair: {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error("header does not declare a {PAYLOAD_OXUM}")]
    MissingOxum,

    #[error("malformed {PAYLOAD_OXUM} value: {0:?}")]
    MalformedOxum(String),
}

/// Declared payload summary: file count and total bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Oxum {
    pub file_count: u64,
    pub total_bytes: u64,
}

impl Oxum {
    /// Parse the `<fileCount>.<totalBytes>` encoding
    pub fn parse(value: &str) -> Result<Self, InfoError> {
        let malformed = || InfoError::MalformedOxum(value.to_string());
        let (count, bytes) = value.split_once('.').ok_or_else(malformed)?;
        Ok(Self {
            file_count: count.parse().map_err(|_| malformed())?,
            total_bytes: bytes.parse().map_err(|_| malformed())?,
        })
    }
}

impl fmt::Display for Oxum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.file_count, self.total_bytes)
    }
}

/// Ordered key-value header
#[derive(Debug, Clone, Default)]
pub struct BagInfo {
    entries: Vec<(String, String)>,
}

impl BagInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse header text, preserving key order
    pub fn parse(text: &str) -> Result<Self, InfoError> {
        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line.split_once(':').ok_or_else(|| InfoError::MalformedLine {
                line: idx + 1,
                text: line.to_string(),
            })?;
            entries.push((key.trim().to_string(), value.trim().to_string()));
        }
        Ok(Self { entries })
    }

    /// First value recorded for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first occurrence of `key` in place, or append it
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    /// Declared payload summary
    pub fn oxum(&self) -> Result<Oxum, InfoError> {
        let value = self.get(PAYLOAD_OXUM).ok_or(InfoError::MissingOxum)?;
        Oxum::parse(value)
    }

    pub fn set_oxum(&mut self, oxum: Oxum) {
        self.set(PAYLOAD_OXUM, oxum.to_string());
    }

    /// Stamp the audit keys for a repair write
    pub fn record_update(&mut self, message: Option<&str>) {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.set(UPDATE_DATE_KEY, now);
        self.set(
            UPDATE_MESSAGE_KEY,
            message.unwrap_or(DEFAULT_UPDATE_MESSAGE),
        );
    }

    /// Serialize back to `Key: Value` lines in recorded order
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oxum_round_trip() {
        let oxum = Oxum::parse("3.1572864").unwrap();
        assert_eq!(oxum.file_count, 3);
        assert_eq!(oxum.total_bytes, 1_572_864);
        assert_eq!(oxum.to_string(), "3.1572864");
    }

    #[test]
    fn test_oxum_malformed() {
        assert!(matches!(Oxum::parse("12"), Err(InfoError::MalformedOxum(_))));
        assert!(matches!(
            Oxum::parse("a.b"),
            Err(InfoError::MalformedOxum(_))
        ));
        assert!(matches!(
            Oxum::parse("3."),
            Err(InfoError::MalformedOxum(_))
        ));
    }

    #[test]
    fn test_parse_preserves_order() {
        let text = "Source-Organization: Example Archive\nPayload-Oxum: 2.10\nContact-Name: Repro\n";
        let info = BagInfo::parse(text).unwrap();

        let keys: Vec<&str> = info.keys().collect();
        assert_eq!(
            keys,
            vec!["Source-Organization", "Payload-Oxum", "Contact-Name"]
        );
        assert_eq!(info.to_text(), text);
    }

    #[test]
    fn test_parse_rejects_bare_line() {
        let err = BagInfo::parse("just some text\n").unwrap_err();
        assert!(matches!(err, InfoError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut info = BagInfo::parse("Payload-Oxum: 1.1\nContact-Name: Repro\n").unwrap();
        info.set_oxum(Oxum {
            file_count: 4,
            total_bytes: 99,
        });

        assert_eq!(info.get(PAYLOAD_OXUM), Some("4.99"));
        let keys: Vec<&str> = info.keys().collect();
        assert_eq!(keys, vec!["Payload-Oxum", "Contact-Name"]);
    }

    #[test]
    fn test_record_update_stamps_audit_keys() {
        let mut info = BagInfo::new();
        info.record_update(Some("added stray sidecar"));

        assert!(info.get(UPDATE_DATE_KEY).is_some());
        assert_eq!(info.get(UPDATE_MESSAGE_KEY), Some("added stray sidecar"));

        info.record_update(None);
        assert_eq!(info.get(UPDATE_MESSAGE_KEY), Some(DEFAULT_UPDATE_MESSAGE));
    }

    #[test]
    fn test_missing_oxum() {
        let info = BagInfo::parse("Contact-Name: Repro\n").unwrap();
        assert!(matches!(info.oxum(), Err(InfoError::MissingOxum)));
    }
}
