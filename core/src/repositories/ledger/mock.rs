//! In-memory implementation of LedgerRepository for testing.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::entities::{Tenant, TenantId, VerificationRecord};
use crate::errors::DomainError;

use super::LedgerRepository;

/// Mock ledger keyed by (tenant, user)
#[derive(Default)]
pub struct MockLedgerRepository {
    records: RwLock<BTreeMap<(TenantId, u64), VerificationRecord>>,
    unavailable: AtomicBool,
    upserts: AtomicUsize,
}

impl MockLedgerRepository {
    /// Create an empty mock ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `StorageUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Seed a row directly
    pub async fn insert(&self, tenant: &Tenant, record: VerificationRecord) {
        self.records
            .write()
            .await
            .insert((tenant.id, record.user_id), record);
    }

    /// Read a row directly
    pub async fn get(&self, tenant: &Tenant, user_id: u64) -> Option<VerificationRecord> {
        self.records.read().await.get(&(tenant.id, user_id)).cloned()
    }

    /// Number of `upsert_verified` calls that succeeded
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::StorageUnavailable {
                message: "mock ledger unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for MockLedgerRepository {
    async fn find_record(
        &self,
        tenant: &Tenant,
        user_id: u64,
    ) -> Result<Option<VerificationRecord>, DomainError> {
        self.check_available()?;
        Ok(self.get(tenant, user_id).await)
    }

    async fn upsert_verified(
        &self,
        tenant: &Tenant,
        record: &VerificationRecord,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        self.insert(tenant, record.clone()).await;
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_records(&self, tenant: &Tenant) -> Result<Vec<VerificationRecord>, DomainError> {
        self.check_available()?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|((tenant_id, _), _)| *tenant_id == tenant.id)
            .map(|(_, record)| record.clone())
            .collect())
    }
}
