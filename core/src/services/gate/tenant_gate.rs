//! Tenant and user scoped async locks.
//!
//! Workflow operations take the tenant lock in shared mode and then the
//! per-user mutex; a ledger swap takes the tenant lock exclusively. The
//! order is always tenant before user.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{
    Mutex as AsyncMutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock,
};

use crate::domain::entities::TenantId;

/// Number of user locks kept before idle ones are pruned
const USER_LOCK_PRUNE_THRESHOLD: usize = 1024;

pub type TenantReadGuard = OwnedRwLockReadGuard<()>;
pub type TenantWriteGuard = OwnedRwLockWriteGuard<()>;

/// Exclusive access to one (tenant, user) key plus shared access to its tenant
///
/// Field order matters: the user lock is released before the tenant lock.
pub struct UserGuard {
    _user: OwnedMutexGuard<()>,
    _tenant: TenantReadGuard,
}

/// Registry of per-tenant reader/writer locks and per-user mutexes
#[derive(Default)]
pub struct TenantGate {
    tenants: Mutex<HashMap<TenantId, Arc<RwLock<()>>>>,
    users: Mutex<HashMap<(TenantId, u64), Arc<AsyncMutex<()>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TenantGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn tenant_lock(&self, tenant: TenantId) -> Arc<RwLock<()>> {
        Arc::clone(lock(&self.tenants).entry(tenant).or_default())
    }

    fn user_lock(&self, tenant: TenantId, user_id: u64) -> Arc<AsyncMutex<()>> {
        let mut users = lock(&self.users);
        if users.len() >= USER_LOCK_PRUNE_THRESHOLD {
            users.retain(|_, user_lock| Arc::strong_count(user_lock) > 1);
        }
        Arc::clone(users.entry((tenant, user_id)).or_default())
    }

    /// Shared access to a tenant; many holders at once
    pub async fn read(&self, tenant: TenantId) -> TenantReadGuard {
        self.tenant_lock(tenant).read_owned().await
    }

    /// Exclusive access to a tenant; waits for every shared holder
    pub async fn write(&self, tenant: TenantId) -> TenantWriteGuard {
        self.tenant_lock(tenant).write_owned().await
    }

    /// Serialize work on one (tenant, user) key
    pub async fn lock_user(&self, tenant: TenantId, user_id: u64) -> UserGuard {
        let tenant_guard = self.read(tenant).await;
        let user_guard = self.user_lock(tenant, user_id).lock_owned().await;
        UserGuard {
            _user: user_guard,
            _tenant: tenant_guard,
        }
    }

    /// Drop user locks nobody holds or waits on; returns how many were removed
    pub fn prune_idle(&self) -> usize {
        let mut users = lock(&self.users);
        let before = users.len();
        users.retain(|_, user_lock| Arc::strong_count(user_lock) > 1);
        before - users.len()
    }

    /// Number of user locks currently tracked
    pub fn tracked_users(&self) -> usize {
        lock(&self.users).len()
    }
}
