// src/error.rs

//! Crate-level error type
//!
//! Module-specific errors (`LoadError`, `RepairError`, ...) convert into this
//! type at the public API boundary via `?`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] crate::bag::LoadError),

    #[error(transparent)]
    Repair(#[from] crate::repair::RepairError),

    #[error(transparent)]
    Metadata(#[from] crate::metadata::MetadataFormatError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
