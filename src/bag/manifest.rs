// src/bag/manifest.rs

//! Checksum manifests and atomic file replacement
//!
//! One manifest file per algorithm (`manifest-sha256.txt`, ...), UTF-8 text,
//! one `<checksum><whitespace><relative-path>` entry per line. Paths are
//! package-root-relative with forward slashes.
//!
//! Rewrites go through [`AtomicCommit`]: every target is staged to a temp
//! file in its own directory first, and renames happen only after all staging
//! succeeded. A failure before the rename phase leaves every target file
//! untouched.

use crate::hash::{self, HashAlgorithm};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Manifest parse errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest line {line} is not `<checksum> <path>`: {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error("manifest line {line} has an invalid checksum: {source}")]
    InvalidChecksum {
        line: usize,
        source: hash::HashError,
    },

    #[error("manifest lists {path:?} more than once")]
    DuplicatePath { path: String },
}

/// A single-algorithm manifest: payload path → hex checksum
#[derive(Debug, Clone)]
pub struct Manifest {
    algorithm: HashAlgorithm,
    entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            entries: BTreeMap::new(),
        }
    }

    /// Parse manifest text. Every non-empty line must carry a checksum valid
    /// for the algorithm followed by a relative path.
    pub fn parse(algorithm: HashAlgorithm, text: &str) -> Result<Self, ManifestError> {
        let mut entries = BTreeMap::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, char::is_whitespace);
            let (Some(checksum), Some(path)) = (parts.next(), parts.next()) else {
                return Err(ManifestError::MalformedLine {
                    line: idx + 1,
                    text: line.to_string(),
                });
            };
            let path = path.trim();
            if path.is_empty() {
                return Err(ManifestError::MalformedLine {
                    line: idx + 1,
                    text: line.to_string(),
                });
            }
            hash::validate_hex(algorithm, checksum).map_err(|source| {
                ManifestError::InvalidChecksum {
                    line: idx + 1,
                    source,
                }
            })?;
            if entries
                .insert(path.to_string(), checksum.to_lowercase())
                .is_some()
            {
                return Err(ManifestError::DuplicatePath {
                    path: path.to_string(),
                });
            }
        }
        Ok(Self { algorithm, entries })
    }

    #[inline]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// On-disk filename for this manifest
    pub fn filename(&self) -> String {
        format!("manifest-{}.txt", self.algorithm)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn checksum(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn insert(&mut self, path: impl Into<String>, checksum: impl Into<String>) {
        self.entries.insert(path.into(), checksum.into());
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.entries.remove(path)
    }

    /// Serialize to manifest text, entries sorted by path
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (path, checksum) in &self.entries {
            out.push_str(checksum);
            out.push_str("  ");
            out.push_str(path);
            out.push('\n');
        }
        out
    }
}

/// Extract the algorithm from a manifest filename like `manifest-sha256.txt`.
///
/// Returns `Ok(None)` for filenames that are not payload manifests and an
/// error for a manifest naming an algorithm this crate cannot verify.
pub fn manifest_algorithm(filename: &str) -> Result<Option<HashAlgorithm>, hash::HashError> {
    let Some(stem) = filename
        .strip_prefix("manifest-")
        .and_then(|rest| rest.strip_suffix(".txt"))
    else {
        return Ok(None);
    };
    stem.parse().map(Some)
}

/// Staged multi-file replacement: all targets are written to temp files
/// first, then renamed into place.
pub struct AtomicCommit {
    staged: Vec<(PathBuf, NamedTempFile)>,
}

impl AtomicCommit {
    pub fn new() -> Self {
        Self { staged: Vec::new() }
    }

    /// Stage `contents` for `target`. Nothing is visible at `target` yet.
    pub fn stage(&mut self, target: &Path, contents: &str) -> io::Result<()> {
        let dir = target.parent().ok_or_else(|| {
            io::Error::other(format!("target has no parent directory: {}", target.display()))
        })?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        self.staged.push((target.to_path_buf(), tmp));
        Ok(())
    }

    /// Rename every staged file into place.
    pub fn commit(self) -> io::Result<()> {
        for (target, tmp) in self.staged {
            tmp.persist(&target).map_err(|e| e.error)?;
        }
        Ok(())
    }
}

impl Default for AtomicCommit {
    fn default() -> Self {
        Self::new()
    }
}
