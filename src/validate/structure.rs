// src/validate/structure.rs

//! Family-level structure checks
//!
//! Each metadata family allows a fixed set of category directories; anything
//! else in the payload is a structural failure. A package whose family
//! resolved but whose subtype did not is also a structural failure, since
//! the remaining subtype-dependent checks would have nothing to work with.

use super::Finding;
use crate::bag::Bag;
use crate::profile::{self, Family, Profile};

pub(super) fn check_structure(
    bag: &Bag,
    family: Family,
    subtype: Option<&'static Profile>,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let allowed = profile::allowed_directories(family);
    let dirs = bag.data_dirs();
    let disallowed: Vec<String> = dirs
        .iter()
        .filter(|dir| !allowed.contains(&dir.as_str()))
        .cloned()
        .collect();
    if !disallowed.is_empty() {
        findings.push(Finding::DisallowedDirectories {
            family,
            found: disallowed,
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        });
    }

    if subtype.is_none() {
        findings.push(Finding::UnclassifiedSubtype {
            family,
            directories: dirs.into_iter().collect(),
            extensions: bag.data_exts().into_iter().collect(),
        });
    }

    findings
}
