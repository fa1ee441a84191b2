// src/validate/integrity.rs

//! Manifest/payload reconciliation
//!
//! Fast mode checks key-set equality between every manifest and the payload
//! plus the declared summary. Thorough mode additionally recomputes every
//! payload checksum and compares per (path, algorithm). All discrepancies are
//! reported; nothing stops at the first. Read-only.

use super::Finding;
use crate::bag::{checksum_files, Bag};
use std::collections::BTreeSet;

pub(super) fn verify_integrity(
    bag: &Bag,
    thorough: bool,
    workers: Option<usize>,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    let payload_paths = bag.payload_paths();

    // key-set equality, per manifest; BTree iteration keeps ordering stable
    for (algorithm, manifest) in bag.manifests() {
        let manifest_paths: BTreeSet<&str> = manifest.paths().collect();
        for path in manifest_paths.difference(&payload_paths) {
            findings.push(Finding::MissingFromPayload {
                algorithm: *algorithm,
                path: (*path).to_string(),
            });
        }
        for path in payload_paths.difference(&manifest_paths) {
            findings.push(Finding::MissingFromManifest {
                algorithm: *algorithm,
                path: (*path).to_string(),
            });
        }
    }

    let declared = bag.declared_oxum();
    let actual = bag.payload_oxum();
    if declared != actual {
        findings.push(Finding::SummaryMismatch { declared, actual });
    }

    if thorough {
        let algorithms = bag.algorithms();
        let paths: Vec<String> = bag.payload().iter().map(|e| e.path.clone()).collect();
        for (path, result) in checksum_files(bag.root(), &paths, &algorithms, workers) {
            match result {
                Err(e) => findings.push(Finding::Unreadable {
                    path,
                    message: e.to_string(),
                }),
                Ok(sums) => {
                    for (algorithm, manifest) in bag.manifests() {
                        let (Some(expected), Some(computed)) =
                            (manifest.checksum(&path), sums.get(algorithm))
                        else {
                            continue; // unlisted paths already reported above
                        };
                        if expected != computed {
                            findings.push(Finding::ChecksumMismatch {
                                algorithm: *algorithm,
                                path: path.clone(),
                                expected: expected.to_string(),
                                actual: computed.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    findings
}
