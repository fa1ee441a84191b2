// src/validate/naming.rs

//! Filename and directory-depth conventions
//!
//! Payload filenames carry a three-letter division code, an object
//! identifier, a volume token, and a role suffix, e.g.
//! `myd_263824_v01_pm.wav`. Filenames with additional sub-object tokens
//! (face, region, stream, part, take) denote compound digitized objects,
//! which this workflow does not support. Category directories are exactly
//! one level deep.

use super::Finding;
use crate::bag::Bag;
use regex::Regex;
use std::sync::LazyLock;

/// Accepted filename shape (searched, not anchored, so prefixes added by
/// scanners do not defeat it)
pub static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z]{3}_[a-z0-9\-]+_v\d{2,3}(?:[frspt]\d{2,3})*_(pm|em|sc|mz)\.[a-z0-9]+")
        .unwrap()
});

/// Sub-object token following the volume token, e.g. `v01f02`
pub static COMPLEX_OBJECT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_v\d{2,3}[frspt]\d{2,3}").unwrap());

fn filename_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Every payload filename must match the naming convention; all offenders
/// are collected.
pub(super) fn check_filenames(bag: &Bag) -> Vec<Finding> {
    let offenders: Vec<String> = bag
        .payload()
        .iter()
        .map(|e| filename_of(&e.path))
        .filter(|name| !FILENAME_PATTERN.is_match(name))
        .map(str::to_string)
        .collect();

    if offenders.is_empty() {
        Vec::new()
    } else {
        vec![Finding::NamingConvention {
            filenames: offenders,
        }]
    }
}

/// Compound/sub-object filenames are unsupported; all offenders collected.
pub(super) fn check_complex_object_names(bag: &Bag) -> Vec<Finding> {
    let offenders: Vec<String> = bag
        .payload()
        .iter()
        .map(|e| filename_of(&e.path))
        .filter(|name| COMPLEX_OBJECT_PATTERN.is_match(name))
        .map(str::to_string)
        .collect();

    if offenders.is_empty() {
        Vec::new()
    } else {
        vec![Finding::ComplexObject {
            filenames: offenders,
        }]
    }
}

/// Category directories may not nest further.
pub(super) fn check_directory_depth(bag: &Bag) -> Vec<Finding> {
    let offenders: Vec<String> = bag
        .data_dirs()
        .into_iter()
        .filter(|dir| dir.contains('/'))
        .collect();

    if offenders.is_empty() {
        Vec::new()
    } else {
        vec![Finding::ExcessDepth {
            directories: offenders,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_pattern_accepts_convention() {
        for name in [
            "myd_263824_v01_pm.wav",
            "scb_1234-56_v02_em.flac",
            "MYD_263824_V01_PM.WAV",
            "myd_263824_v01_sc.mp4",
            "myd_263824_v103_mz.mov",
        ] {
            assert!(FILENAME_PATTERN.is_match(name), "should accept {name}");
        }
    }

    #[test]
    fn test_filename_pattern_rejects_strays() {
        for name in ["Thumbs.db", ".DS_Store", "notes.txt", "myd_263824.wav"] {
            assert!(!FILENAME_PATTERN.is_match(name), "should reject {name}");
        }
    }

    #[test]
    fn test_complex_object_pattern() {
        assert!(COMPLEX_OBJECT_PATTERN.is_match("myd_263824_v01f02_pm.wav"));
        assert!(COMPLEX_OBJECT_PATTERN.is_match("myd_263824_v01r01_pm.mov"));
        assert!(!COMPLEX_OBJECT_PATTERN.is_match("myd_263824_v01_pm.wav"));
    }
}
