// src/validate/crosscheck.rs

//! Metadata-to-payload correspondence
//!
//! The two metadata families carry deliberately different contracts:
//! spreadsheet references must be a *superset* of the payload media files
//! (extra rows are tolerated, unreferenced media is not), while sidecar
//! records must enumerate the payload media *exactly*: neither missing nor
//! extra records are tolerated. Hybrid packages cross-check through their
//! sidecar records.

use super::Finding;
use crate::bag::Bag;
use crate::metadata::{MetadataFormatError, SheetReader, SidecarRecord};
use crate::profile::{Family, SHEET_EXT, SIDECAR_EXT};
use std::collections::BTreeSet;

pub(super) fn check_metadata(
    bag: &Bag,
    family: Family,
    sheet_reader: Option<&dyn SheetReader>,
) -> Vec<Finding> {
    match family {
        Family::Spreadsheet => check_sheets(bag, sheet_reader),
        Family::Sidecar | Family::Hybrid => check_sidecars(bag, family),
    }
}

fn payload_with_ext<'a>(bag: &'a Bag, ext: &str) -> Vec<&'a str> {
    bag.payload()
        .iter()
        .map(|e| e.path.as_str())
        .filter(|p| p.to_lowercase().ends_with(ext))
        .collect()
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn basename_no_ext(path: &str) -> &str {
    let name = basename(path);
    match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    }
}

/// Spreadsheet family: union the referenced basenames of every sheet, then
/// require that union to cover the payload media basenames.
fn check_sheets(bag: &Bag, reader: Option<&dyn SheetReader>) -> Vec<Finding> {
    let sheets = payload_with_ext(bag, SHEET_EXT);
    if sheets.is_empty() {
        return vec![Finding::MissingMetadataFiles {
            family: Family::Spreadsheet,
        }];
    }
    let Some(reader) = reader else {
        return vec![Finding::MetadataFormat(
            MetadataFormatError::SheetReaderUnavailable,
        )];
    };

    let mut findings = Vec::new();
    let mut referenced = BTreeSet::new();
    for sheet in &sheets {
        let path = bag.root().join(sheet);
        if let Err(e) = reader.validate_format(&path) {
            findings.push(Finding::MetadataFormat(e));
        }
        match reader.referenced_basenames(&path) {
            Ok(names) => referenced.extend(names),
            Err(e) => findings.push(Finding::MetadataFormat(e)),
        }
    }

    let missing: Vec<String> = bag
        .media_files()
        .iter()
        .map(|p| basename_no_ext(p).to_string())
        .filter(|name| !referenced.contains(name))
        .collect();
    if !missing.is_empty() {
        findings.push(Finding::MetadataMissingReferences { missing });
    }

    findings
}

/// Sidecar and hybrid families: the set of declared `filename.extension`
/// values must equal the payload media basenames exactly.
fn check_sidecars(bag: &Bag, family: Family) -> Vec<Finding> {
    let sidecars = payload_with_ext(bag, SIDECAR_EXT);
    if sidecars.is_empty() {
        return vec![Finding::MissingMetadataFiles { family }];
    }

    let mut findings = Vec::new();
    let mut declared = BTreeSet::new();
    for sidecar in &sidecars {
        match SidecarRecord::read(&bag.root().join(sidecar)) {
            Ok(record) => {
                declared.insert(record.media_filename());
            }
            Err(e) => findings.push(Finding::MetadataFormat(e)),
        }
    }

    let media: BTreeSet<String> = bag
        .media_files()
        .iter()
        .map(|p| basename(p).to_string())
        .collect();

    let missing: Vec<String> = media.difference(&declared).cloned().collect();
    if !missing.is_empty() {
        findings.push(Finding::MetadataMissingReferences { missing });
    }
    let extra: Vec<String> = declared.difference(&media).cloned().collect();
    if !extra.is_empty() {
        findings.push(Finding::MetadataExtraReferences { extra });
    }

    findings
}
