// src/lib.rs

//! mediabag
//!
//! Validation and repair engine for audio/video archival packages used in
//! long-term preservation. A package is a directory tree with a payload
//! under `data/`, one checksum manifest per algorithm, and a `Key: Value`
//! header declaring the payload summary.
//!
//! # Architecture
//!
//! - Reads are side-effect free: validation returns structured findings and
//!   never stops at the first failure
//! - Repairs are all-or-nothing: header and manifest rewrites are staged to
//!   temp files and renamed only once all staging succeeded
//! - Classification is data-driven: ordered profile registries evaluated by
//!   one subset-containment predicate, first match wins
//! - Checksum computation fans out over a worker pool; aggregation is
//!   single-threaded so reported order is always stable

pub mod bag;
mod error;
pub mod hash;
pub mod metadata;
pub mod profile;
pub mod repair;
pub mod validate;

pub use bag::{Bag, BagInfo, LoadError, Manifest, Oxum, PayloadEntry};
pub use error::{Error, Result};
pub use hash::{HashAlgorithm, Hasher};
pub use metadata::{MetadataFormatError, SheetReader, SidecarRecord};
pub use profile::{Family, Profile, ProfileRegistry};
pub use repair::{ExclusionRule, RepairError};
pub use validate::{Finding, ValidateOptions, ValidationReport};
