//! File moves used by the ledger swap

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Moves performed while swapping ledger files
///
/// Swaps and rollbacks go through this trait so a failing move can be
/// simulated.
#[async_trait]
pub trait LedgerFileSystem: Send + Sync {
    /// Move `from` to `to`, replacing `to` if it exists
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Local disk via `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

#[async_trait]
impl LedgerFileSystem for LocalFileSystem {
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::rename(from, to).await
    }
}
