// src/bag/payload.rs

//! Payload scanning and parallel checksum computation
//!
//! The payload lives under `data/` inside the package root. Scanning walks it
//! once and returns entries sorted by relative path; checksum computation fans
//! out over a worker pool, one file per worker, and aggregates single-threaded
//! so downstream reporting order never depends on worker completion order.

use crate::hash::{self, HashAlgorithm};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Name of the payload directory inside a package root
pub const PAYLOAD_DIR: &str = "data";

/// A file found under the payload root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEntry {
    /// Path relative to the package root, forward slashes (`data/...`)
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

/// Checksums computed for one payload file, per requested algorithm
pub type FileChecksums = BTreeMap<HashAlgorithm, String>;

/// Convert a path under `root` to a forward-slash relative string
fn relative_unix_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Scan the payload directory and return entries sorted by path.
///
/// A missing `data/` directory yields an empty payload; whether that is an
/// error is decided by the load path, not here.
pub fn scan_payload(root: &Path) -> io::Result<Vec<PayloadEntry>> {
    let payload_root = root.join(PAYLOAD_DIR);
    if !payload_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(&payload_root) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let metadata = entry.metadata().map_err(io::Error::other)?;
        let Some(path) = relative_unix_path(root, entry.path()) else {
            warn!("skipping non-UTF-8 payload path: {:?}", entry.path());
            continue;
        };
        entries.push(PayloadEntry {
            path,
            size: metadata.len(),
        });
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("scanned {} payload files", entries.len());
    Ok(entries)
}

/// Checksum the given payload-relative paths with every requested algorithm.
///
/// Each worker reads one file and returns its digests; a per-file read error
/// is returned in place so callers can report it without aborting the rest of
/// the pass. Output order matches input order. `workers` caps the pool size;
/// `Some(1)` degenerates to a sequential pass with identical results.
pub fn checksum_files(
    root: &Path,
    paths: &[String],
    algorithms: &[HashAlgorithm],
    workers: Option<usize>,
) -> Vec<(String, io::Result<FileChecksums>)> {
    let run = || {
        paths
            .par_iter()
            .map(|path| {
                let result = hash::hash_file_multi(&root.join(path), algorithms);
                (path.clone(), result)
            })
            .collect()
    };

    match workers {
        Some(count) => match rayon::ThreadPoolBuilder::new().num_threads(count).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!("failed to build {count}-thread checksum pool, using default: {e}");
                run()
            }
        },
        None => run(),
    }
}
