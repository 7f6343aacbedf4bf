//! Administrative export and import of a tenant's ledger.

use async_trait::async_trait;

use crate::domain::entities::Tenant;
use crate::domain::value_objects::{ImportReport, LedgerExport};
use crate::errors::DomainResult;

/// Replace or download a tenant's whole verification ledger
#[async_trait]
pub trait LedgerBackupTrait: Send + Sync {
    /// Return the live ledger file verbatim
    ///
    /// Fails with `NotFound` if the tenant has no ledger on disk.
    async fn export(&self, tenant: &Tenant, actor: &str) -> DomainResult<LedgerExport>;

    /// Validate an uploaded ledger and swap it in place of the live one
    ///
    /// On failure the live ledger is left as it was, or restored from the
    /// backup taken during the swap.
    async fn import(
        &self,
        tenant: &Tenant,
        filename: &str,
        bytes: &[u8],
        actor: &str,
    ) -> DomainResult<ImportReport>;

    /// Number of ledgers currently open
    fn open_stores(&self) -> usize;
}
