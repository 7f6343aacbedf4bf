//! Store multiplexer: one lazily opened SQLite pool per tenant.
//!
//! Each tenant's ledger is a single file `{data_dir}/{safe_name}_{id}.db`.
//! Pools use a single connection and the `DELETE` journal, so the file on
//! disk is always the complete ledger and can be copied or moved as one
//! unit once the pool is closed.
//!
//! The file a tenant resolves to is pinned the first time its store is
//! opened. Later requests carrying a different display name (a renamed
//! guild) keep using that file, so the ledger, export and swap all agree
//! on one path per tenant for the life of the process. When the
//! name-derived file does not exist yet, an existing `*_{id}.db` file for
//! the same tenant id is adopted instead of starting an empty ledger.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex as AsyncMutex;

use gg_core::domain::entities::{Tenant, TenantId};
use gg_shared::StorageConfig;

use crate::InfrastructureError;

/// Column definitions of the `users` table
pub const LEDGER_COLUMNS: &str =
    "discord_id INTEGER PRIMARY KEY, email TEXT, verified INTEGER DEFAULT 0, verified_at INTEGER";

/// Schema every ledger must have; applied on every open
pub fn ledger_schema() -> String {
    format!("CREATE TABLE IF NOT EXISTS users ({})", LEDGER_COLUMNS)
}

/// Open handle to one tenant's ledger
pub type StoreHandle = SqlitePool;

#[derive(Default)]
struct SlotState {
    pool: Option<SqlitePool>,
    /// File this tenant resolved to when first opened; kept across closes
    path: Option<PathBuf>,
}

impl SlotState {
    fn open_pool(&self) -> Option<&SqlitePool> {
        self.pool.as_ref().filter(|pool| !pool.is_closed())
    }
}

type Slot = Arc<AsyncMutex<SlotState>>;

/// Owner of every open tenant store
///
/// Each tenant has its own slot lock, so opening one tenant's store never
/// waits on another's, while concurrent first calls for the same tenant
/// open exactly one pool.
pub struct StoreMultiplexer {
    config: StorageConfig,
    slots: Mutex<HashMap<TenantId, Slot>>,
    open: AtomicUsize,
}

impl StoreMultiplexer {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
            open: AtomicUsize::new(0),
        }
    }

    pub fn data_dir(&self) -> &Path {
        self.config.data_dir()
    }

    /// Ledger file derived from the tenant's current display name
    pub fn path_for(&self, tenant: &Tenant) -> PathBuf {
        self.config
            .data_dir()
            .join(format!("{}.db", tenant.storage_key()))
    }

    /// Directory holding a tenant's staged uploads and replaced ledgers
    pub fn backup_dir_for(&self, tenant: &Tenant) -> PathBuf {
        self.config.backup_root().join(tenant.safe_name())
    }

    /// Ledger file the tenant's handle reads and writes
    ///
    /// This is the pinned path once the store has been opened in this
    /// process, otherwise the name-derived [`path_for`](Self::path_for).
    pub async fn live_path(&self, tenant: &Tenant) -> PathBuf {
        let slot = self.slots().get(&tenant.id).cloned();
        if let Some(slot) = slot {
            if let Some(path) = slot.lock().await.path.clone() {
                return path;
            }
        }
        self.resolve_path(tenant).await
    }

    async fn resolve_path(&self, tenant: &Tenant) -> PathBuf {
        let derived = self.path_for(tenant);
        if tokio::fs::try_exists(&derived).await.unwrap_or(false) {
            return derived;
        }
        match self.find_existing(tenant.id).await {
            Some(existing) => {
                tracing::warn!(
                    tenant_id = %tenant.id,
                    name = %tenant.name,
                    path = %existing.display(),
                    event = "store_adopted",
                    "Using existing ledger stored under a previous tenant name"
                );
                existing
            }
            None => derived,
        }
    }

    /// Most recently modified `*_{id}.db` file in the data directory
    async fn find_existing(&self, tenant: TenantId) -> Option<PathBuf> {
        let suffix = format!("_{}.db", tenant);
        let mut entries = tokio::fs::read_dir(self.data_dir()).await.ok()?;
        let mut newest: Option<(SystemTime, PathBuf)> = None;

        while let Ok(Some(entry)) = entries.next_entry().await {
            if !entry.file_name().to_string_lossy().ends_with(&suffix) {
                continue;
            }
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            if newest.as_ref().map_or(true, |(seen, _)| modified > *seen) {
                newest = Some((modified, entry.path()));
            }
        }
        newest.map(|(_, path)| path)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<TenantId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, tenant: TenantId) -> Slot {
        Arc::clone(self.slots().entry(tenant).or_default())
    }

    /// Return the tenant's open handle, creating the store and schema if needed
    ///
    /// On failure nothing is cached and the next call tries again.
    pub async fn get(&self, tenant: &Tenant) -> Result<StoreHandle, InfrastructureError> {
        let slot = self.slot(tenant.id);
        let mut state = slot.lock().await;

        if let Some(pool) = state.open_pool() {
            return Ok(pool.clone());
        }

        let path = match &state.path {
            Some(pinned) => {
                if *pinned != self.path_for(tenant) {
                    tracing::warn!(
                        tenant_id = %tenant.id,
                        name = %tenant.name,
                        path = %pinned.display(),
                        event = "store_name_changed",
                        "Tenant name changed, keeping the existing ledger file"
                    );
                }
                pinned.clone()
            }
            None => self.resolve_path(tenant).await,
        };
        let pool = Self::open(&path).await.map_err(|e| {
            tracing::error!(
                tenant_id = %tenant.id,
                path = %path.display(),
                error = %e,
                event = "store_open_failed",
                "Could not open tenant store"
            );
            InfrastructureError::StoreUnavailable {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;

        if state.pool.replace(pool.clone()).is_none() {
            self.open.fetch_add(1, Ordering::SeqCst);
        }
        state.path = Some(path.clone());
        tracing::info!(
            tenant_id = %tenant.id,
            path = %path.display(),
            event = "store_opened",
            "Opened tenant store"
        );
        Ok(pool)
    }

    async fn open(path: &Path) -> Result<SqlitePool, InfrastructureError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        if let Err(e) = sqlx::query(&ledger_schema()).execute(&pool).await {
            pool.close().await;
            return Err(e.into());
        }
        Ok(pool)
    }

    /// Close and discard a tenant's handle; a no-op when none is open
    pub async fn close(&self, tenant: TenantId) {
        let slot = self.slots().get(&tenant).cloned();
        let Some(slot) = slot else {
            return;
        };

        let pool = slot.lock().await.pool.take();
        if let Some(pool) = pool {
            pool.close().await;
            self.open.fetch_sub(1, Ordering::SeqCst);
            tracing::info!(tenant_id = %tenant, event = "store_closed", "Closed tenant store");
        }
    }

    /// Close every open handle, for process shutdown
    pub async fn close_all(&self) {
        let tenants: Vec<TenantId> = self.slots().keys().copied().collect();
        for tenant in tenants {
            self.close(tenant).await;
        }
    }

    /// Whether a handle is currently cached for the tenant
    pub async fn is_open(&self, tenant: TenantId) -> bool {
        let slot = self.slots().get(&tenant).cloned();
        match slot {
            Some(slot) => slot.lock().await.open_pool().is_some(),
            None => false,
        }
    }

    /// Number of cached handles
    pub fn open_count(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}
