// src/commands.rs
//! Command implementations for the mediabag CLI
//!
//! Each `cmd_*` function backs one subcommand defined in `cli.rs`. The
//! validation command prints every finding and reports overall validity
//! through its return value so `main` can set the exit code.

use anyhow::{Context, Result};
use mediabag::{Bag, ExclusionRule, ValidateOptions};
use std::path::Path;

/// Validate a package, print every finding, and return overall validity.
pub fn cmd_validate(
    package: &Path,
    thorough: bool,
    metadata: bool,
    workers: Option<usize>,
) -> Result<bool> {
    let bag = Bag::open_strict(package)
        .with_context(|| format!("cannot open package {}", package.display()))?;

    let report = bag.validate(&ValidateOptions {
        thorough,
        metadata,
        workers,
        sheet_reader: None,
    });

    match bag.family() {
        Some(family) => {
            let subtype = bag
                .subtype(family)
                .map(|p| p.name)
                .unwrap_or("unclassified");
            println!("{}: {} {} package", package.display(), family, subtype);
        }
        None => println!("{}: unclassified package", package.display()),
    }

    if report.valid {
        println!("OK: package is valid");
    } else {
        println!("INVALID: {} finding(s)", report.findings.len());
        for finding in &report.findings {
            println!("  - {finding}");
        }
    }
    Ok(report.valid)
}

/// Rewrite the declared payload summary to match the payload.
pub fn cmd_repair_oxum(package: &Path, message: Option<&str>) -> Result<()> {
    let mut bag = Bag::open(package)
        .with_context(|| format!("cannot open package {}", package.display()))?;

    if bag.reconcile_oxum(message)? {
        println!("Declared payload summary updated to {}", bag.declared_oxum());
    } else {
        println!("Declared payload summary already matches the payload");
    }
    Ok(())
}

/// Add unmanifested payload files to every manifest.
pub fn cmd_repair_add(
    package: &Path,
    message: Option<&str>,
    workers: Option<usize>,
) -> Result<()> {
    let mut bag = Bag::open(package)
        .with_context(|| format!("cannot open package {}", package.display()))?;

    let added = bag.add_unmanifested(message, workers)?;
    if added.is_empty() {
        println!("No unmanifested files found");
    } else {
        println!("Added {} file(s) to all manifests:", added.len());
        for path in &added {
            println!("  + {path}");
        }
    }
    Ok(())
}

/// Delete unmanifested payload files subject to exclusion rules.
pub fn cmd_repair_delete(
    package: &Path,
    remove: &[String],
    keep: &[String],
    message: Option<&str>,
) -> Result<()> {
    let mut rules = Vec::new();
    for pattern in remove {
        rules.push(
            ExclusionRule::new(format!("remove {pattern}"), pattern, true)
                .with_context(|| format!("invalid --remove pattern {pattern:?}"))?,
        );
    }
    for pattern in keep {
        rules.push(
            ExclusionRule::new(format!("keep {pattern}"), pattern, false)
                .with_context(|| format!("invalid --keep pattern {pattern:?}"))?,
        );
    }

    let mut bag = Bag::open(package)
        .with_context(|| format!("cannot open package {}", package.display()))?;

    let deleted = bag.delete_unmanifested(&rules, message)?;
    if deleted.is_empty() {
        println!("No unmanifested files deleted");
    } else {
        println!("Deleted {} file(s):", deleted.len());
        for path in &deleted {
            println!("  - {path}");
        }
    }
    Ok(())
}
