//! Tests for the tenant gate

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::domain::entities::TenantId;
use crate::services::gate::TenantGate;

const SHORT: Duration = Duration::from_millis(50);

#[tokio::test]
async fn test_same_user_is_serialized() {
    let gate = TenantGate::new();
    let _held = gate.lock_user(TenantId(1), 7).await;

    let second = timeout(SHORT, gate.lock_user(TenantId(1), 7)).await;
    assert!(second.is_err());
}

#[tokio::test]
async fn test_different_users_proceed_in_parallel() {
    let gate = TenantGate::new();
    let _held = gate.lock_user(TenantId(1), 7).await;

    let other = timeout(SHORT, gate.lock_user(TenantId(1), 8)).await;
    assert!(other.is_ok());
}

#[tokio::test]
async fn test_writer_waits_for_workflow() {
    let gate = Arc::new(TenantGate::new());
    let held = gate.lock_user(TenantId(1), 7).await;

    assert!(timeout(SHORT, gate.write(TenantId(1))).await.is_err());
    drop(held);
    assert!(timeout(SHORT, gate.write(TenantId(1))).await.is_ok());
}

#[tokio::test]
async fn test_writer_blocks_workflow_of_same_tenant_only() {
    let gate = TenantGate::new();
    let _swap = gate.write(TenantId(1)).await;

    assert!(timeout(SHORT, gate.lock_user(TenantId(1), 7)).await.is_err());
    assert!(timeout(SHORT, gate.lock_user(TenantId(2), 7)).await.is_ok());
}

#[tokio::test]
async fn test_idle_user_locks_are_pruned() {
    let gate = TenantGate::new();
    {
        let _a = gate.lock_user(TenantId(1), 1).await;
        let _b = gate.lock_user(TenantId(1), 2).await;
        assert_eq!(gate.prune_idle(), 0);
    }
    assert_eq!(gate.tracked_users(), 2);
    assert_eq!(gate.prune_idle(), 2);
    assert_eq!(gate.tracked_users(), 0);
}
