//! Backup/restore manager for tenant ledgers

use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use gg_core::domain::entities::{AuditEvent, Tenant};
use gg_core::domain::value_objects::{ImportReport, LedgerExport};
use gg_core::errors::{DomainError, DomainResult};
use gg_core::services::audit::{AuditChannelTrait, AuditService};
use gg_core::services::backup::LedgerBackupTrait;
use gg_core::services::gate::TenantGate;

use super::super::multiplexer::StoreMultiplexer;
use super::fs::{LedgerFileSystem, LocalFileSystem};
use super::validate::validate_and_normalize;

/// Prefix of the download name offered by `export`
pub const EXPORT_FILENAME_PREFIX: &str = "verification_backup_";

/// Export and atomic import of whole tenant ledgers
///
/// Shares the [`TenantGate`] with the verification workflow: export reads
/// under the tenant's shared lock, the swap runs under its exclusive lock,
/// so no verification step ever sees a half-replaced store.
pub struct BackupService {
    stores: Arc<StoreMultiplexer>,
    gate: Arc<TenantGate>,
    fs: Arc<dyn LedgerFileSystem>,
    audit: AuditService<dyn AuditChannelTrait>,
}

impl BackupService {
    pub fn new(
        stores: Arc<StoreMultiplexer>,
        gate: Arc<TenantGate>,
        audit: AuditService<dyn AuditChannelTrait>,
    ) -> Self {
        Self {
            stores,
            gate,
            fs: Arc::new(LocalFileSystem),
            audit,
        }
    }

    /// Replace the file system used for swap moves
    pub fn with_file_system(mut self, fs: Arc<dyn LedgerFileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Export the live ledger file
    pub async fn export_ledger(&self, tenant: &Tenant, actor: &str) -> DomainResult<LedgerExport> {
        let _guard = self.gate.read(tenant.id).await;
        let path = self.stores.live_path(tenant).await;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    tenant_id = %tenant.id,
                    path = %path.display(),
                    event = "export_missing",
                    "Export requested but no ledger file exists"
                );
                return Err(DomainError::NotFound {
                    resource: "verification database".to_string(),
                });
            }
            Err(e) => return Err(io_error(e)),
        };

        tracing::info!(
            tenant_id = %tenant.id,
            actor = actor,
            bytes = bytes.len(),
            event = "ledger_exported",
            "Exported verification database"
        );
        self.audit
            .record(
                tenant,
                AuditEvent::LedgerExported {
                    actor: actor.to_string(),
                },
            )
            .await;

        Ok(LedgerExport {
            filename: format!("{}{}.db", EXPORT_FILENAME_PREFIX, tenant.id),
            bytes,
        })
    }

    /// Validate an uploaded ledger and swap it in for the live one
    ///
    /// This method:
    /// 1. Writes the upload to a tenant-scoped staging file
    /// 2. Validates and normalizes the staged copy
    /// 3. Under the tenant's exclusive lock, closes the live handle, moves
    ///    the live file to a timestamped backup and the staged file into
    ///    place, then reopens the handle
    /// 4. Rolls back to the backup if any part of step 3 fails
    ///
    /// The staging file is removed whatever the outcome.
    pub async fn import_ledger(
        &self,
        tenant: &Tenant,
        filename: &str,
        bytes: &[u8],
        actor: &str,
    ) -> DomainResult<ImportReport> {
        if !filename.to_lowercase().ends_with(".db") {
            return Err(DomainError::Validation {
                reason: "please upload a .db SQLite3 file".to_string(),
            });
        }

        let staging_dir = self.stores.backup_dir_for(tenant);
        let staged = staging_dir.join(format!(
            "upload_{}_{}.db",
            Utc::now().timestamp(),
            Uuid::new_v4().simple()
        ));

        let result = match self.stage(&staging_dir, &staged, bytes).await {
            Ok(()) => self.install(tenant, &staged).await,
            Err(e) => Err(e),
        };
        remove_staged(&staged).await;

        match &result {
            Ok(report) => {
                tracing::info!(
                    tenant_id = %tenant.id,
                    actor = actor,
                    rows = report.row_count,
                    backup = ?report.backup_path,
                    event = "ledger_imported",
                    "Replaced verification database"
                );
                self.audit
                    .record(
                        tenant,
                        AuditEvent::LedgerImported {
                            actor: actor.to_string(),
                            rows: report.row_count,
                        },
                    )
                    .await;
            }
            Err(DomainError::RollbackFailed { reason }) => {
                self.audit
                    .record(
                        tenant,
                        AuditEvent::RollbackFailed {
                            actor: actor.to_string(),
                            reason: reason.clone(),
                        },
                    )
                    .await;
            }
            Err(e) => {
                tracing::warn!(
                    tenant_id = %tenant.id,
                    actor = actor,
                    error = %e,
                    event = "ledger_import_failed",
                    "Database import failed"
                );
                self.audit
                    .record(
                        tenant,
                        AuditEvent::LedgerImportFailed {
                            actor: actor.to_string(),
                            reason: e.to_string(),
                        },
                    )
                    .await;
            }
        }

        result
    }

    async fn stage(&self, staging_dir: &Path, staged: &Path, bytes: &[u8]) -> DomainResult<()> {
        tokio::fs::create_dir_all(staging_dir).await.map_err(io_error)?;
        tokio::fs::write(staged, bytes).await.map_err(io_error)?;
        tracing::debug!(
            path = %staged.display(),
            bytes = bytes.len(),
            event = "ledger_staged",
            "Staged uploaded ledger"
        );
        Ok(())
    }

    async fn install(&self, tenant: &Tenant, staged: &Path) -> DomainResult<ImportReport> {
        let row_count = validate_and_normalize(staged).await?;

        let _guard = self.gate.write(tenant.id).await;
        let backup_path = self.swap(tenant, staged).await?;

        Ok(ImportReport {
            backup_path,
            row_count,
        })
    }

    /// Swap the staged file in; caller holds the tenant's exclusive lock
    async fn swap(&self, tenant: &Tenant, staged: &Path) -> DomainResult<Option<PathBuf>> {
        let live = self.stores.live_path(tenant).await;
        self.stores.close(tenant.id).await;

        let backup_path = if tokio::fs::metadata(&live).await.is_ok() {
            let stem = live
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| tenant.storage_key());
            let backup = self.stores.backup_dir_for(tenant).join(format!(
                "{}_{}.backup",
                stem,
                Utc::now().timestamp_millis()
            ));
            if let Err(e) = self.fs.rename(&live, &backup).await {
                // Nothing moved yet; the live file is still in place
                return Err(DomainError::Swap {
                    reason: format!("could not back up the live database: {}", e),
                });
            }
            tracing::info!(
                tenant_id = %tenant.id,
                path = %backup.display(),
                event = "ledger_backup_created",
                "Created database backup"
            );
            Some(backup)
        } else {
            None
        };

        if let Err(e) = self.fs.rename(staged, &live).await {
            return Err(self
                .rollback(tenant, &live, backup_path.as_deref(), e.to_string())
                .await);
        }

        if let Err(e) = self.stores.get(tenant).await {
            return Err(self
                .rollback(tenant, &live, backup_path.as_deref(), e.to_string())
                .await);
        }

        Ok(backup_path)
    }

    /// Put the backup back at the live path and reopen it
    async fn rollback(
        &self,
        tenant: &Tenant,
        live: &Path,
        backup: Option<&Path>,
        reason: String,
    ) -> DomainError {
        tracing::error!(
            tenant_id = %tenant.id,
            error = %reason,
            event = "ledger_swap_failed",
            "Swap failed, rolling back"
        );
        self.stores.close(tenant.id).await;

        let Some(backup) = backup else {
            // There was no previous ledger; drop whatever reached the live path
            if let Err(e) = tokio::fs::remove_file(live).await {
                if e.kind() != io::ErrorKind::NotFound {
                    return self.rollback_failed(tenant, &reason, &e.to_string());
                }
            }
            return DomainError::Swap { reason };
        };

        if let Err(e) = self.fs.rename(backup, live).await {
            return self.rollback_failed(tenant, &reason, &e.to_string());
        }
        if let Err(e) = self.stores.get(tenant).await {
            return self.rollback_failed(tenant, &reason, &e.to_string());
        }

        tracing::warn!(
            tenant_id = %tenant.id,
            path = %backup.display(),
            event = "ledger_rolled_back",
            "Restored previous database after failed swap"
        );
        DomainError::Swap { reason }
    }

    fn rollback_failed(&self, tenant: &Tenant, reason: &str, rollback_error: &str) -> DomainError {
        tracing::error!(
            tenant_id = %tenant.id,
            severity = "critical",
            error = %reason,
            rollback_error = rollback_error,
            event = "rollback_failed",
            "ROLLBACK FAILED: operator intervention required"
        );
        DomainError::RollbackFailed {
            reason: format!("{} (rollback: {})", reason, rollback_error),
        }
    }
}

fn io_error(e: io::Error) -> DomainError {
    DomainError::Io {
        message: e.to_string(),
    }
}

async fn remove_staged(staged: &Path) {
    match tokio::fs::remove_file(staged).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %staged.display(),
            error = %e,
            "Could not remove staged upload"
        ),
    }
}

#[async_trait]
impl LedgerBackupTrait for BackupService {
    async fn export(&self, tenant: &Tenant, actor: &str) -> DomainResult<LedgerExport> {
        self.export_ledger(tenant, actor).await
    }

    async fn import(
        &self,
        tenant: &Tenant,
        filename: &str,
        bytes: &[u8],
        actor: &str,
    ) -> DomainResult<ImportReport> {
        self.import_ledger(tenant, filename, bytes, actor).await
    }

    fn open_stores(&self) -> usize {
        self.stores.open_count()
    }
}
