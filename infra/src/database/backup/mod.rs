//! Ledger backup and restore.
//!
//! An import stages the uploaded bytes, validates and normalizes the
//! staged copy, then swaps it for the live ledger under the tenant's
//! exclusive lock, rolling back to the previous file if the swap fails.

mod fs;
mod service;
mod validate;

pub use fs::{LedgerFileSystem, LocalFileSystem};
pub use service::{BackupService, EXPORT_FILENAME_PREFIX};
pub use validate::validate_and_normalize;
