//! Values produced by ledger export and import.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Live ledger file, verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerExport {
    /// Suggested download name, `verification_backup_{tenant_id}.db`
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Summary of a completed import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Where the replaced ledger was moved; `None` when no live file existed
    pub backup_path: Option<PathBuf>,
    /// Rows in the newly installed ledger
    pub row_count: u64,
}
