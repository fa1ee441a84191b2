// tests/common/mod.rs

//! Shared fixture builder for integration tests.
//!
//! Builds real packages inside a `TempDir`: payload files under `data/`, one
//! manifest per requested algorithm, the `bagit.txt` declaration, and a
//! `bag-info.txt` header whose `Payload-Oxum` matches what was written.

#![allow(dead_code)]

use mediabag::hash::{self, HashAlgorithm};
use mediabag::metadata::{MetadataFormatError, SheetReader};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct PackageBuilder {
    files: Vec<(String, Vec<u8>)>,
    algorithms: Vec<HashAlgorithm>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            algorithms: vec![HashAlgorithm::Sha256],
        }
    }

    pub fn algorithms(mut self, algorithms: &[HashAlgorithm]) -> Self {
        self.algorithms = algorithms.to_vec();
        self
    }

    /// Add a payload file under `data/`
    pub fn file(mut self, rel: &str, contents: &[u8]) -> Self {
        self.files.push((format!("data/{rel}"), contents.to_vec()));
        self
    }

    /// Add a per-item sidecar record under `data/`
    pub fn sidecar(self, rel: &str, filename: &str, extension: &str) -> Self {
        let json = format!(
            r#"{{"technical": {{"filename": "{filename}", "extension": "{extension}"}}}}"#
        );
        self.file(rel, json.as_bytes())
    }

    /// Write the package to disk. Keep the `TempDir` alive to prevent
    /// cleanup.
    pub fn build(self) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let mut total_bytes = 0u64;
        for (rel, contents) in &self.files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, contents).unwrap();
            total_bytes += contents.len() as u64;
        }

        let mut sorted = self.files.clone();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        for algorithm in &self.algorithms {
            let mut text = String::new();
            for (rel, contents) in &sorted {
                text.push_str(&format!(
                    "{}  {rel}\n",
                    hash::hash_bytes(*algorithm, contents)
                ));
            }
            fs::write(root.join(format!("manifest-{algorithm}.txt")), text).unwrap();
        }

        fs::write(
            root.join("bagit.txt"),
            "BagIt-Version: 0.97\nTag-File-Character-Encoding: UTF-8\n",
        )
        .unwrap();
        fs::write(
            root.join("bag-info.txt"),
            format!(
                "Bag-Software-Agent: mediabag test fixtures\nPayload-Oxum: {}.{total_bytes}\n",
                self.files.len()
            ),
        )
        .unwrap();

        (dir, root)
    }
}

/// A spreadsheet-family audio package: one preservation master plus one
/// metadata workbook.
pub fn spreadsheet_audio_package() -> (TempDir, PathBuf) {
    PackageBuilder::new()
        .file("PreservationMasters/myd_263824_v01_pm.wav", b"wav bytes")
        .file("Metadata/myd_263824_v01_pm.xlsx", b"workbook bytes")
        .build()
}

/// Spreadsheet access stub: a fixed set of referenced basenames.
pub struct StubSheetReader {
    pub basenames: BTreeSet<String>,
    pub valid: bool,
}

impl StubSheetReader {
    pub fn referencing(names: &[&str]) -> Self {
        Self {
            basenames: names.iter().map(|s| s.to_string()).collect(),
            valid: true,
        }
    }
}

impl SheetReader for StubSheetReader {
    fn referenced_basenames(
        &self,
        _sheet: &Path,
    ) -> Result<BTreeSet<String>, MetadataFormatError> {
        Ok(self.basenames.clone())
    }

    fn validate_format(&self, sheet: &Path) -> Result<(), MetadataFormatError> {
        if self.valid {
            Ok(())
        } else {
            Err(MetadataFormatError::InvalidSheet {
                path: sheet.display().to_string(),
                reason: "stub rejected workbook".to_string(),
            })
        }
    }
}
