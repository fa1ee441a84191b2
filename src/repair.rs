// src/repair.rs

//! Repair operations
//!
//! Repairs bring the declared summary and manifests back in line with the
//! payload on disk: reconciling the oxum, adding unmanifested files to every
//! manifest, or deleting them subject to exclusion rules. Every header and
//! manifest rewrite is staged to temp files and renamed only once all staging
//! succeeded; an I/O failure mid-repair leaves the package in its pre-repair
//! state. Callers must serialize repairs against the same package root;
//! reads may run concurrently.

use crate::bag::{checksum_files, AtomicCommit, Bag, BagInfo, FileChecksums, Manifest, Oxum};
use crate::hash::HashAlgorithm;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use thiserror::Error;
use tracing::{debug, info};

/// Repair errors. All of them abort the operation with the on-disk package
/// unchanged except for payload deletions already performed by
/// [`Bag::delete_unmanifested`].
#[derive(Debug, Error)]
pub enum RepairError {
    #[error("failed to checksum {path}: {source}")]
    Checksum { path: String, source: io::Error },

    #[error("failed to delete {path}: {source}")]
    Delete { path: String, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Declarative deletion rule: `pattern` selects the paths the rule covers,
/// `matches` decides whether covered paths are deleted (`true`) or protected
/// (`false`).
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    pub name: String,
    pattern: Regex,
    pub matches: bool,
}

impl ExclusionRule {
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        matches: bool,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            matches,
        })
    }

    /// Whether this rule covers the given payload-relative path
    pub fn covers(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

/// Evaluate a rule set against one path. An empty rule set deletes
/// unconditionally; otherwise a path is deleted only when a covering rule
/// votes for deletion and no covering rule protects it, and a path covered
/// by no rule is left untouched.
pub fn deletion_allowed(path: &str, rules: &[ExclusionRule]) -> bool {
    if rules.is_empty() {
        return true;
    }
    let mut allowed = false;
    for rule in rules {
        if !rule.covers(path) {
            continue;
        }
        if rule.matches {
            allowed = true;
        } else {
            return false;
        }
    }
    allowed
}

impl Bag {
    /// Rewrite the declared payload summary to match the payload, stamping
    /// the audit keys. Idempotent: returns `false` without touching disk
    /// when the summary already matches.
    pub fn reconcile_oxum(&mut self, message: Option<&str>) -> Result<bool, RepairError> {
        let actual = self.payload_oxum();
        if actual == self.declared_oxum() {
            debug!("declared summary already matches payload");
            return Ok(false);
        }

        let mut updated = self.info().clone();
        updated.set_oxum(actual);
        updated.record_update(message);
        self.commit_state(None, Some((updated, actual)))?;
        info!("declared payload summary updated to {actual}");
        Ok(true)
    }

    /// Payload paths absent from every manifest, sorted
    pub fn find_unmanifested(&self) -> Vec<String> {
        self.payload()
            .iter()
            .map(|e| e.path.clone())
            .filter(|path| !self.manifests().values().any(|m| m.contains(path)))
            .collect()
    }

    /// Atomically append entries to every active manifest, keeping the
    /// manifests in sync.
    pub fn append_manifest_entries(
        &mut self,
        entries: &[(String, FileChecksums)],
    ) -> Result<(), RepairError> {
        let mut manifests = self.manifests().clone();
        for (path, sums) in entries {
            for manifest in manifests.values_mut() {
                if let Some(checksum) = sums.get(&manifest.algorithm()) {
                    manifest.insert(path.clone(), checksum.clone());
                }
            }
        }
        self.commit_state(Some(manifests), None)
    }

    /// Checksum every unmanifested file, append it to all manifests, and
    /// reconcile the summary. Returns the paths added.
    pub fn add_unmanifested(
        &mut self,
        message: Option<&str>,
        workers: Option<usize>,
    ) -> Result<Vec<String>, RepairError> {
        let paths = self.find_unmanifested();
        if paths.is_empty() {
            self.reconcile_oxum(message)?;
            return Ok(paths);
        }

        let algorithms = self.algorithms();
        let mut entries: Vec<(String, FileChecksums)> = Vec::with_capacity(paths.len());
        for (path, result) in checksum_files(self.root(), &paths, &algorithms, workers) {
            match result {
                Ok(sums) => entries.push((path, sums)),
                Err(source) => return Err(RepairError::Checksum { path, source }),
            }
        }

        // bundle manifests and header into one staged commit so a failure
        // cannot leave manifests updated with a stale summary
        let mut manifests = self.manifests().clone();
        for (path, sums) in &entries {
            for manifest in manifests.values_mut() {
                if let Some(checksum) = sums.get(&manifest.algorithm()) {
                    manifest.insert(path.clone(), checksum.clone());
                }
            }
        }
        let actual = self.payload_oxum();
        let header = if actual != self.declared_oxum() {
            let mut updated = self.info().clone();
            updated.set_oxum(actual);
            updated.record_update(message);
            Some((updated, actual))
        } else {
            None
        };
        self.commit_state(Some(manifests), header)?;

        info!(
            "added {} unmanifested files to {} manifests",
            paths.len(),
            self.manifests().len()
        );
        Ok(paths)
    }

    /// Delete unmanifested files subject to `rules`, then reconcile the
    /// summary. Returns the paths deleted. Deletion aborts on the first I/O
    /// failure, before any manifest or header rewrite.
    pub fn delete_unmanifested(
        &mut self,
        rules: &[ExclusionRule],
        message: Option<&str>,
    ) -> Result<Vec<String>, RepairError> {
        let mut deleted = Vec::new();
        for path in self.find_unmanifested() {
            if !deletion_allowed(&path, rules) {
                debug!("leaving unmanifested file {path} (not eligible under rules)");
                continue;
            }
            fs::remove_file(self.root().join(&path)).map_err(|source| RepairError::Delete {
                path: path.clone(),
                source,
            })?;
            info!("deleted unmanifested file {path}");
            deleted.push(path);
        }

        self.rescan()?;
        self.reconcile_oxum(message)?;
        Ok(deleted)
    }

    /// Stage the given replacement state and rename it into place, updating
    /// the in-memory view only after the commit succeeded.
    fn commit_state(
        &mut self,
        manifests: Option<BTreeMap<HashAlgorithm, Manifest>>,
        header: Option<(BagInfo, Oxum)>,
    ) -> Result<(), RepairError> {
        let mut commit = AtomicCommit::new();
        if let Some(manifests) = &manifests {
            for manifest in manifests.values() {
                commit.stage(&self.manifest_path(manifest), &manifest.to_text())?;
            }
        }
        if let Some((info, _)) = &header {
            commit.stage(&self.info_path(), &info.to_text())?;
        }
        commit.commit()?;

        if let Some(manifests) = manifests {
            *self.manifests_mut() = manifests;
        }
        if let Some((info, oxum)) = header {
            *self.info_mut() = info;
            self.set_declared_oxum(oxum);
        }
        Ok(())
    }
}
