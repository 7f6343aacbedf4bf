//! Tests for the mock ledger repository implementation

use chrono::Utc;

use crate::domain::entities::{Tenant, VerificationRecord};
use crate::errors::DomainError;
use crate::repositories::{LedgerRepository, MockLedgerRepository};

#[tokio::test]
async fn test_mock_upsert_overwrites_in_place() {
    let repo = MockLedgerRepository::new();
    let tenant = Tenant::new(1, "guild");

    let first = VerificationRecord::verified_now(5, "a@example.com", Utc::now());
    repo.upsert_verified(&tenant, &first).await.unwrap();
    let second = VerificationRecord::verified_now(5, "b@example.com", Utc::now());
    repo.upsert_verified(&tenant, &second).await.unwrap();

    let found = repo.find_record(&tenant, 5).await.unwrap().unwrap();
    assert_eq!(found.email, "b@example.com");
    assert_eq!(repo.list_records(&tenant).await.unwrap().len(), 1);
    assert_eq!(repo.upsert_count(), 2);
}

#[tokio::test]
async fn test_mock_keeps_tenants_apart() {
    let repo = MockLedgerRepository::new();
    let first = Tenant::new(1, "one");
    let second = Tenant::new(2, "two");

    repo.insert(&first, VerificationRecord::verified_now(5, "a@example.com", Utc::now()))
        .await;

    assert!(repo.find_record(&second, 5).await.unwrap().is_none());
    assert!(repo.list_records(&second).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mock_unavailable() {
    let repo = MockLedgerRepository::new();
    repo.set_unavailable(true);

    let result = repo.find_record(&Tenant::new(1, "guild"), 5).await;
    assert!(matches!(result, Err(DomainError::StorageUnavailable { .. })));
}
