//! Ledger repository trait defining the interface for verification records.

use async_trait::async_trait;

use crate::domain::entities::{Tenant, VerificationRecord};
use crate::errors::DomainError;

/// Repository trait for per-tenant verification ledgers
///
/// Every call is scoped to one tenant; implementations keep tenants in
/// separate stores and never read across them.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Find the ledger row for a user
    ///
    /// # Returns
    /// * `Ok(Some(record))` if the user has a row
    /// * `Ok(None)` if the user never verified in this tenant
    /// * `Err(DomainError::StorageUnavailable)` if the store cannot be opened
    async fn find_record(
        &self,
        tenant: &Tenant,
        user_id: u64,
    ) -> Result<Option<VerificationRecord>, DomainError>;

    /// Insert or overwrite the row for `record.user_id` as a single durable write
    async fn upsert_verified(
        &self,
        tenant: &Tenant,
        record: &VerificationRecord,
    ) -> Result<(), DomainError>;

    /// All rows of the tenant's ledger, ordered by user id
    async fn list_records(&self, tenant: &Tenant) -> Result<Vec<VerificationRecord>, DomainError>;
}
