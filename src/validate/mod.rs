// src/validate/mod.rs

//! Validation orchestrator
//!
//! Runs the checks in a fixed order and never stops at the first failure:
//! integrity, naming conventions, directory depth, family and subtype
//! classification, family structure, and (opt-in) metadata format plus
//! cross-validation. Every failed check becomes a [`Finding`]; the overall
//! verdict is the AND of all stages. Only package *loading* fails fast; see
//! [`crate::bag::Bag::open_strict`].

mod crosscheck;
mod integrity;
mod naming;
mod structure;

pub use naming::{COMPLEX_OBJECT_PATTERN, FILENAME_PATTERN};

use crate::bag::{Bag, Oxum};
use crate::hash::HashAlgorithm;
use crate::metadata::{MetadataFormatError, SheetReader};
use crate::profile::Family;
use thiserror::Error;
use tracing::{info, warn};

/// A single validation failure. Variants carry every offender found, not
/// just the first.
#[derive(Debug, Error)]
pub enum Finding {
    #[error("listed in {algorithm} manifest but missing from payload: {path}")]
    MissingFromPayload {
        algorithm: HashAlgorithm,
        path: String,
    },

    #[error("present in payload but missing from {algorithm} manifest: {path}")]
    MissingFromManifest {
        algorithm: HashAlgorithm,
        path: String,
    },

    #[error("{algorithm} mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        algorithm: HashAlgorithm,
        path: String,
        expected: String,
        actual: String,
    },

    #[error("failed to read payload file {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("declared payload summary {declared} does not match actual {actual}")]
    SummaryMismatch { declared: Oxum, actual: Oxum },

    #[error("non-standard filenames: {filenames:?}")]
    NamingConvention { filenames: Vec<String> },

    #[error("complex digitized objects are not supported: {filenames:?}")]
    ComplexObject { filenames: Vec<String> },

    #[error("too many directory levels under data/: {directories:?}")]
    ExcessDepth { directories: Vec<String> },

    #[error("{family} packages may not use directories {found:?} (allowed: {allowed:?})")]
    DisallowedDirectories {
        family: Family,
        found: Vec<String>,
        allowed: Vec<String>,
    },

    #[error("package carries neither spreadsheet metadata nor sidecar records")]
    UnclassifiedType,

    #[error(
        "package matches no {family} profile (directories {directories:?}, extensions {extensions:?})"
    )]
    UnclassifiedSubtype {
        family: Family,
        directories: Vec<String>,
        extensions: Vec<String>,
    },

    #[error("package has no metadata files for its {family} family")]
    MissingMetadataFiles { family: Family },

    #[error(transparent)]
    MetadataFormat(#[from] MetadataFormatError),

    #[error("payload media files not referenced by metadata: {missing:?}")]
    MetadataMissingReferences { missing: Vec<String> },

    #[error("metadata references files absent from the payload: {extra:?}")]
    MetadataExtraReferences { extra: Vec<String> },
}

/// Validation knobs
#[derive(Default)]
pub struct ValidateOptions<'a> {
    /// Recompute every payload checksum instead of key-set equality only
    pub thorough: bool,
    /// Run metadata format and cross-validation checks
    pub metadata: bool,
    /// Checksum worker count; `None` uses the default pool
    pub workers: Option<usize>,
    /// Spreadsheet access for the spreadsheet family's metadata checks
    pub sheet_reader: Option<&'a dyn SheetReader>,
}

/// Outcome of a validation pass
#[derive(Debug)]
pub struct ValidationReport {
    /// AND of every stage outcome
    pub valid: bool,
    /// Every failure found, in stage order
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Bag {
    /// Run every validation stage and collect all findings.
    pub fn validate(&self, opts: &ValidateOptions<'_>) -> ValidationReport {
        let mut findings = Vec::new();

        findings.extend(integrity::verify_integrity(self, opts.thorough, opts.workers));
        findings.extend(naming::check_filenames(self));
        findings.extend(naming::check_complex_object_names(self));
        findings.extend(naming::check_directory_depth(self));

        match self.family() {
            None => findings.push(Finding::UnclassifiedType),
            Some(family) => {
                let subtype = self.subtype(family);
                findings.extend(structure::check_structure(self, family, subtype));
                if opts.metadata {
                    findings.extend(crosscheck::check_metadata(self, family, opts.sheet_reader));
                }
            }
        }

        for finding in &findings {
            warn!("{}: {finding}", self.root().display());
        }
        let valid = findings.is_empty();
        if valid {
            info!("{} passed validation", self.root().display());
        }
        ValidationReport { valid, findings }
    }
}
