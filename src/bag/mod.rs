// src/bag/mod.rs

//! Archival package access
//!
//! A package is a directory tree: a `bagit.txt` declaration, a `bag-info.txt`
//! header, one checksum manifest per algorithm, and the payload under
//! `data/`. [`Bag::open`] performs a structural load (headers and manifests
//! must parse) and is what repair operations use; [`Bag::open_strict`]
//! additionally enforces the fail-fast gates validation requires: fast
//! completeness, the mandatory `PreservationMasters` directory, and at least
//! one accepted media file.
//!
//! All reads are side-effect free. Mutation happens only through the repair
//! operations in [`crate::repair`], which stage every rewrite through
//! [`AtomicCommit`].

mod info;
mod manifest;
mod payload;

pub use info::{
    BagInfo, InfoError, Oxum, DEFAULT_UPDATE_MESSAGE, INFO_FILE, PAYLOAD_OXUM, UPDATE_DATE_KEY,
    UPDATE_MESSAGE_KEY,
};
pub use manifest::{manifest_algorithm, AtomicCommit, Manifest, ManifestError};
pub use payload::{checksum_files, scan_payload, FileChecksums, PayloadEntry, PAYLOAD_DIR};

use crate::hash::HashAlgorithm;
use crate::profile::{self, Family, Profile, ProfileRegistry};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// BagIt declaration file that marks a directory as a package
pub const DECLARATION_FILE: &str = "bagit.txt";

/// Fatal load errors: the package cannot be opened at all
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("not an archival package (missing {DECLARATION_FILE}): {}", .0.display())]
    NotAPackage(PathBuf),

    #[error("package has no checksum manifests: {}", .0.display())]
    NoManifests(PathBuf),

    #[error("unsupported manifest {file}: {source}")]
    UnsupportedAlgorithm {
        file: String,
        source: crate::hash::HashError,
    },

    #[error("malformed manifest {file}: {source}")]
    MalformedManifest {
        file: String,
        source: ManifestError,
    },

    #[error("malformed package header: {0}")]
    MalformedInfo(#[from] InfoError),

    #[error("payload does not match manifests or declared summary: {details}")]
    Incomplete { details: String },

    #[error("payload does not contain a {} directory", profile::PRESERVATION_MASTERS)]
    MissingPreservationMasters,

    #[error("payload contains no files with accepted media extensions {0:?}")]
    NoMediaFiles(&'static [&'static str]),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An opened archival package
#[derive(Debug)]
pub struct Bag {
    root: PathBuf,
    info: BagInfo,
    declared: Oxum,
    manifests: BTreeMap<HashAlgorithm, Manifest>,
    payload: Vec<PayloadEntry>,
}

impl Bag {
    /// Structural load: declaration, header, and manifests must parse, and
    /// the header must declare a payload summary. The payload is scanned but
    /// not reconciled against the manifests, so drifted packages stay
    /// openable for repair.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let root = path.as_ref().to_path_buf();

        if !root.join(DECLARATION_FILE).is_file() {
            return Err(LoadError::NotAPackage(root));
        }

        let info_path = root.join(INFO_FILE);
        if !info_path.is_file() {
            return Err(LoadError::MalformedInfo(InfoError::MissingHeader));
        }
        let info = BagInfo::parse(&fs::read_to_string(&info_path)?)?;
        let declared = info.oxum()?;

        let mut manifests = BTreeMap::new();
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let algorithm = match manifest_algorithm(name) {
                Ok(Some(algorithm)) => algorithm,
                Ok(None) => continue,
                Err(source) => {
                    return Err(LoadError::UnsupportedAlgorithm {
                        file: name.to_string(),
                        source,
                    });
                }
            };
            let text = fs::read_to_string(entry.path())?;
            let manifest = Manifest::parse(algorithm, &text).map_err(|source| {
                LoadError::MalformedManifest {
                    file: name.to_string(),
                    source,
                }
            })?;
            manifests.insert(algorithm, manifest);
        }
        if manifests.is_empty() {
            return Err(LoadError::NoManifests(root));
        }

        let payload = scan_payload(&root)?;
        debug!(
            "opened package {} ({} manifests, {} payload files)",
            root.display(),
            manifests.len(),
            payload.len()
        );

        Ok(Self {
            root,
            info,
            declared,
            manifests,
            payload,
        })
    }

    /// Load for validation: [`Bag::open`] plus the fail-fast gates. A package
    /// that fails any gate cannot be opened for validation at all.
    pub fn open_strict(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let bag = Self::open(path)?;

        let problems = bag.completeness_problems();
        if !problems.is_empty() {
            return Err(LoadError::Incomplete {
                details: problems.join("; "),
            });
        }
        if !bag.data_dirs().contains(profile::PRESERVATION_MASTERS) {
            return Err(LoadError::MissingPreservationMasters);
        }
        if bag.media_files().is_empty() {
            return Err(LoadError::NoMediaFiles(profile::MEDIA_EXTENSIONS));
        }

        match bag.family() {
            Some(family) => {
                let subtype = bag
                    .subtype(family)
                    .map(|p| p.name)
                    .unwrap_or("unclassified");
                info!(
                    "{} loaded as {} {} package",
                    bag.root.display(),
                    family,
                    subtype
                );
            }
            None => info!("{} loaded (no metadata family)", bag.root.display()),
        }
        Ok(bag)
    }

    /// Cheap drift summary used by the strict-open gate. Full findings come
    /// from [`crate::validate`].
    fn completeness_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let payload_paths = self.payload_paths();
        for manifest in self.manifests.values() {
            let manifest_paths: BTreeSet<&str> = manifest.paths().collect();
            let missing = manifest_paths.difference(&payload_paths).count();
            let extra = payload_paths.difference(&manifest_paths).count();
            if missing > 0 || extra > 0 {
                problems.push(format!(
                    "{}: {missing} listed files missing from payload, {extra} payload files unlisted",
                    manifest.filename()
                ));
            }
        }
        let actual = self.payload_oxum();
        if actual != self.declared {
            problems.push(format!(
                "declared payload summary {} != actual {actual}",
                self.declared
            ));
        }
        problems
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn info(&self) -> &BagInfo {
        &self.info
    }

    pub(crate) fn info_mut(&mut self) -> &mut BagInfo {
        &mut self.info
    }

    #[inline]
    pub fn manifests(&self) -> &BTreeMap<HashAlgorithm, Manifest> {
        &self.manifests
    }

    pub(crate) fn manifests_mut(&mut self) -> &mut BTreeMap<HashAlgorithm, Manifest> {
        &mut self.manifests
    }

    /// Manifest algorithms active for this package, sorted
    pub fn algorithms(&self) -> Vec<HashAlgorithm> {
        self.manifests.keys().copied().collect()
    }

    #[inline]
    pub fn payload(&self) -> &[PayloadEntry] {
        &self.payload
    }

    /// Declared payload summary from the header
    #[inline]
    pub fn declared_oxum(&self) -> Oxum {
        self.declared
    }

    pub(crate) fn set_declared_oxum(&mut self, oxum: Oxum) {
        self.declared = oxum;
    }

    /// Recomputed payload summary from the current scan
    pub fn payload_oxum(&self) -> Oxum {
        Oxum {
            file_count: self.payload.len() as u64,
            total_bytes: self.payload.iter().map(|e| e.size).sum(),
        }
    }

    /// Payload paths, sorted
    pub fn payload_paths(&self) -> BTreeSet<&str> {
        self.payload.iter().map(|e| e.path.as_str()).collect()
    }

    /// Category directories under `data/`. A nested path like `A/B` is kept
    /// whole so depth checks can flag it; files sitting directly in `data/`
    /// contribute an empty component.
    pub fn data_dirs(&self) -> BTreeSet<String> {
        self.payload
            .iter()
            .map(|e| {
                let rel = e.path.strip_prefix("data/").unwrap_or(&e.path);
                match rel.rsplit_once('/') {
                    Some((dir, _)) => dir.to_string(),
                    None => String::new(),
                }
            })
            .collect()
    }

    /// Lowercased payload file extensions (with dot; empty string for none)
    pub fn data_exts(&self) -> BTreeSet<String> {
        self.payload
            .iter()
            .map(|e| {
                let name = e.path.rsplit('/').next().unwrap_or(&e.path);
                match name.rsplit_once('.') {
                    Some((_, ext)) => format!(".{}", ext.to_lowercase()),
                    None => String::new(),
                }
            })
            .collect()
    }

    /// Payload paths with accepted media extensions, sorted
    pub fn media_files(&self) -> BTreeSet<&str> {
        self.payload
            .iter()
            .map(|e| e.path.as_str())
            .filter(|p| profile::is_media_file(p))
            .collect()
    }

    /// Metadata family, if the package carries either convention
    pub fn family(&self) -> Option<Family> {
        profile::classify_family(&self.data_dirs(), &self.data_exts())
    }

    /// Subtype within a family: first matching profile in registry order
    pub fn subtype(&self, family: Family) -> Option<&'static Profile> {
        ProfileRegistry::for_family(family).classify(&self.data_dirs(), &self.data_exts())
    }

    pub(crate) fn info_path(&self) -> PathBuf {
        self.root.join(INFO_FILE)
    }

    pub(crate) fn manifest_path(&self, manifest: &Manifest) -> PathBuf {
        self.root.join(manifest.filename())
    }

    /// Re-scan the payload after files were added or removed on disk
    pub(crate) fn rescan(&mut self) -> std::io::Result<()> {
        self.payload = scan_payload(&self.root)?;
        Ok(())
    }
}
