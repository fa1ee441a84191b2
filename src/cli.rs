// src/cli.rs
//! CLI definitions for mediabag
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediabag")]
#[command(version)]
#[command(about = "Validate and repair audio/video archival packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a package and report every finding
    Validate {
        /// Path to the package root
        package: PathBuf,

        /// Recompute every payload checksum (slow) instead of the fast
        /// completeness check
        #[arg(long)]
        thorough: bool,

        /// Also run metadata format and cross-validation checks
        #[arg(long)]
        metadata: bool,

        /// Checksum worker count (default: one per CPU core)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Repair drift between the payload and its manifests
    Repair {
        /// Path to the package root
        package: PathBuf,

        #[command(subcommand)]
        action: RepairAction,
    },
}

#[derive(Subcommand)]
pub enum RepairAction {
    /// Rewrite the declared payload summary to match the payload
    Oxum {
        /// Audit message recorded in the package header
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Checksum unmanifested payload files and append them to every manifest
    Add {
        /// Audit message recorded in the package header
        #[arg(short, long)]
        message: Option<String>,

        /// Checksum worker count (default: one per CPU core)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Delete unmanifested payload files, honoring exclusion rules
    Delete {
        /// Delete only unmanifested paths matching REGEX (repeatable)
        #[arg(long, value_name = "REGEX")]
        remove: Vec<String>,

        /// Protect unmanifested paths matching REGEX from deletion
        /// (repeatable)
        #[arg(long, value_name = "REGEX")]
        keep: Vec<String>,

        /// Audit message recorded in the package header
        #[arg(short, long)]
        message: Option<String>,
    },
}
