// src/metadata.rs

//! Collaborator boundary for structured metadata records
//!
//! Cross-validation compares filenames declared by metadata against the
//! payload, but parsing spreadsheet workbooks is not this crate's business:
//! callers supply a [`SheetReader`]. Per-item JSON sidecar records are simple
//! enough that a serde adapter lives here.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors from malformed or unreadable metadata, reported per offending file
#[derive(Debug, Error)]
pub enum MetadataFormatError {
    #[error("failed to read metadata file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed sidecar record {path}: {source}")]
    MalformedSidecar {
        path: String,
        source: serde_json::Error,
    },

    #[error("sidecar record {path} declares an empty filename")]
    EmptyReference { path: String },

    #[error("spreadsheet {path} failed format validation: {reason}")]
    InvalidSheet { path: String, reason: String },

    #[error("no spreadsheet reader was supplied, cannot check sheet metadata")]
    SheetReaderUnavailable,
}

#[derive(Debug, Deserialize)]
struct SidecarDocument {
    technical: TechnicalSection,
}

#[derive(Debug, Deserialize)]
struct TechnicalSection {
    filename: String,
    extension: String,
}

/// One per-item sidecar record: the media file it describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarRecord {
    pub filename: String,
    pub extension: String,
}

impl SidecarRecord {
    /// Read and parse a sidecar record from disk
    pub fn read(path: &Path) -> Result<Self, MetadataFormatError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| MetadataFormatError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&display, &text)
    }

    /// Parse a sidecar record from JSON text
    pub fn from_json(path: &str, text: &str) -> Result<Self, MetadataFormatError> {
        let doc: SidecarDocument =
            serde_json::from_str(text).map_err(|source| MetadataFormatError::MalformedSidecar {
                path: path.to_string(),
                source,
            })?;
        if doc.technical.filename.is_empty() || doc.technical.extension.is_empty() {
            return Err(MetadataFormatError::EmptyReference {
                path: path.to_string(),
            });
        }
        Ok(Self {
            filename: doc.technical.filename,
            extension: doc.technical.extension,
        })
    }

    /// The media filename this record declares, `<filename>.<extension>`
    pub fn media_filename(&self) -> String {
        format!("{}.{}", self.filename, self.extension)
    }
}

/// Caller-supplied spreadsheet access. A workbook may carry a preservation
/// sheet and an optional edit-copy sheet; `referenced_basenames` returns the
/// union of reference-filename cells across the sheets present.
pub trait SheetReader {
    /// Basenames (extension stripped) referenced by the workbook
    fn referenced_basenames(&self, sheet: &Path)
        -> Result<BTreeSet<String>, MetadataFormatError>;

    /// Workbook-level format validity
    fn validate_format(&self, sheet: &Path) -> Result<(), MetadataFormatError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_parse() {
        let text = r#"{
            "technical": {
                "filename": "myd_263824_v01_pm",
                "extension": "wav",
                "durationMilli": {"measure": 1800000, "unit": "ms"}
            },
            "source": {"object": {"type": "audio cassette"}}
        }"#;
        let record = SidecarRecord::from_json("r.json", text).unwrap();
        assert_eq!(record.filename, "myd_263824_v01_pm");
        assert_eq!(record.extension, "wav");
        assert_eq!(record.media_filename(), "myd_263824_v01_pm.wav");
    }

    #[test]
    fn test_sidecar_missing_technical_section() {
        let err = SidecarRecord::from_json("r.json", r#"{"source": {}}"#).unwrap_err();
        assert!(matches!(err, MetadataFormatError::MalformedSidecar { .. }));
    }

    #[test]
    fn test_sidecar_empty_reference() {
        let text = r#"{"technical": {"filename": "", "extension": "wav"}}"#;
        let err = SidecarRecord::from_json("r.json", text).unwrap_err();
        assert!(matches!(err, MetadataFormatError::EmptyReference { .. }));
    }

    #[test]
    fn test_sidecar_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("myd_1_v01_pm.json");
        std::fs::write(
            &path,
            r#"{"technical": {"filename": "myd_1_v01_pm", "extension": "flac"}}"#,
        )
        .unwrap();

        let record = SidecarRecord::read(&path).unwrap();
        assert_eq!(record.media_filename(), "myd_1_v01_pm.flac");
    }
}
