//! Integration tests for ledger export and atomic import

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use gg_core::domain::entities::{Tenant, VerificationRecord};
use gg_core::errors::DomainError;
use gg_core::repositories::LedgerRepository;
use gg_core::services::audit::{AuditChannelTrait, AuditService, AuditServiceConfig};
use gg_core::services::backup::LedgerBackupTrait;
use gg_core::services::gate::TenantGate;
use gg_core::services::verification::mock::MockAuditChannel;
use gg_infra::{BackupService, LedgerFileSystem, SqliteLedgerRepository, StoreMultiplexer};
use gg_shared::StorageConfig;

/// Rename that fails on the listed calls (1-based) and works otherwise
struct FaultyFileSystem {
    calls: AtomicUsize,
    fail_on: Vec<usize>,
}

impl FaultyFileSystem {
    fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on,
        }
    }
}

#[async_trait]
impl LedgerFileSystem for FaultyFileSystem {
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on.contains(&call) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected rename failure"));
        }
        tokio::fs::rename(from, to).await
    }
}

struct Harness {
    dir: TempDir,
    stores: Arc<StoreMultiplexer>,
    gate: Arc<TenantGate>,
    repo: SqliteLedgerRepository,
    audit: Arc<MockAuditChannel>,
    backup: BackupService,
}

impl Harness {
    fn new() -> Self {
        Self::with_file_system(None)
    }

    fn with_file_system(fs: Option<Arc<dyn LedgerFileSystem>>) -> Self {
        let dir = TempDir::new().unwrap();
        let stores = Arc::new(StoreMultiplexer::new(StorageConfig::new(dir.path().join("guild_dbs"))));
        let gate = Arc::new(TenantGate::new());
        let audit = Arc::new(MockAuditChannel::new());
        let channel: Arc<dyn AuditChannelTrait> = audit.clone();
        let service = AuditService::new(
            channel,
            AuditServiceConfig {
                async_writes: false,
                ..AuditServiceConfig::default()
            },
        );

        let mut backup = BackupService::new(Arc::clone(&stores), Arc::clone(&gate), service);
        if let Some(fs) = fs {
            backup = backup.with_file_system(fs);
        }

        Self {
            repo: SqliteLedgerRepository::new(Arc::clone(&stores)),
            dir,
            stores,
            gate,
            audit,
            backup,
        }
    }

    fn tenant() -> Tenant {
        Tenant::new(4242u64, "Guild One")
    }

    fn live_path(&self) -> PathBuf {
        self.stores.path_for(&Self::tenant())
    }

    fn backup_dir(&self) -> PathBuf {
        self.stores.backup_dir_for(&Self::tenant())
    }

    async fn seed(&self, user_id: u64, email: &str) -> VerificationRecord {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap();
        let record = VerificationRecord::verified_now(user_id, email, at);
        self.repo.upsert_verified(&Self::tenant(), &record).await.unwrap();
        record
    }

    fn staged_uploads(&self) -> Vec<String> {
        match std::fs::read_dir(self.backup_dir()) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().to_string())
                .filter(|name| name.starts_with("upload_"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Ledger file with only the two required columns
async fn legacy_ledger(dir: &Path) -> Vec<u8> {
    let path = dir.join("legacy.db");
    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .unwrap();
    sqlx::query("CREATE TABLE users (discord_id INTEGER PRIMARY KEY, email TEXT)")
        .execute(&mut conn)
        .await
        .unwrap();
    sqlx::query("INSERT INTO users VALUES (11, 'old1@uni.edu'), (12, 'old2@uni.edu')")
        .execute(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();
    std::fs::read(&path).unwrap()
}

/// Ledger whose `discord_id` column carries no key constraint
async fn unkeyed_ledger(dir: &Path) -> Vec<u8> {
    let path = dir.join("unkeyed.db");
    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .unwrap();
    sqlx::query("CREATE TABLE users (discord_id INTEGER, email TEXT)")
        .execute(&mut conn)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO users VALUES (11, 'first@uni.edu'), (12, 'b@uni.edu'), \
         (11, 'latest@uni.edu'), (NULL, 'orphan@uni.edu')",
    )
    .execute(&mut conn)
    .await
    .unwrap();
    conn.close().await.unwrap();
    std::fs::read(&path).unwrap()
}

#[tokio::test]
async fn test_export_then_import_restores_snapshot() {
    let h = Harness::new();
    let tenant = Harness::tenant();
    let original = h.seed(1, "a@uni.edu").await;

    let export = h.backup.export(&tenant, "admin#1").await.unwrap();
    assert_eq!(export.filename, "verification_backup_4242.db");
    assert!(!export.bytes.is_empty());

    h.seed(2, "b@uni.edu").await;
    let report = h
        .backup
        .import(&tenant, &export.filename, &export.bytes, "admin#1")
        .await
        .unwrap();

    assert_eq!(report.row_count, 1);
    let backup_path = report.backup_path.unwrap();
    assert!(backup_path.exists());
    assert!(backup_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("Guild_One_4242_"));

    assert_eq!(h.repo.find_record(&tenant, 1).await.unwrap(), Some(original));
    assert_eq!(h.repo.find_record(&tenant, 2).await.unwrap(), None);
    assert!(h.staged_uploads().is_empty());

    let texts = h.audit.texts();
    assert!(texts.contains(&"📤 admin#1 exported the verification database.".to_string()));
    assert!(texts.contains(&"📥 admin#1 safely replaced the verification database (1 rows).".to_string()));
}

#[tokio::test]
async fn test_import_normalizes_legacy_schema() {
    let h = Harness::new();
    let tenant = Harness::tenant();
    h.seed(1, "a@uni.edu").await;
    let bytes = legacy_ledger(h.dir.path()).await;

    let report = h.backup.import(&tenant, "legacy.DB", &bytes, "admin#1").await.unwrap();

    assert_eq!(report.row_count, 2);
    let records = h.repo.list_records(&tenant).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.verified && r.verified_at.is_none()));
    assert_eq!(records[0].email, "old1@uni.edu");
}

#[tokio::test]
async fn test_corrupt_upload_leaves_live_store_untouched() {
    let h = Harness::new();
    let tenant = Harness::tenant();
    h.seed(1, "a@uni.edu").await;
    let before = std::fs::read(h.live_path()).unwrap();

    let result = h
        .backup
        .import(&tenant, "broken.db", b"definitely not sqlite", "admin#1")
        .await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
    assert_eq!(std::fs::read(h.live_path()).unwrap(), before);
    assert!(h.staged_uploads().is_empty());
    assert!(h.repo.find_record(&tenant, 1).await.unwrap().is_some());
    assert!(h
        .audit
        .texts()
        .iter()
        .any(|line| line.starts_with("❌ Database import by admin#1 failed")));
}

#[tokio::test]
async fn test_upload_without_users_table_is_rejected() {
    let h = Harness::new();
    let path = h.dir.path().join("other.db");
    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .unwrap();
    sqlx::query("CREATE TABLE members (id INTEGER)")
        .execute(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();
    let bytes = std::fs::read(&path).unwrap();

    let result = h.backup.import(&Harness::tenant(), "other.db", &bytes, "admin#1").await;

    match result {
        Err(DomainError::Validation { reason }) => assert!(reason.contains("users")),
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_db_filename_is_rejected_before_staging() {
    let h = Harness::new();

    let result = h
        .backup
        .import(&Harness::tenant(), "ledger.sqlite", b"whatever", "admin#1")
        .await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
    assert!(!h.backup_dir().exists());
}

#[tokio::test]
async fn test_failed_move_rolls_back_to_previous_ledger() {
    let h = Harness::with_file_system(Some(Arc::new(FaultyFileSystem::failing_on(vec![2]))));
    let tenant = Harness::tenant();
    let original = h.seed(1, "a@uni.edu").await;
    let before = std::fs::read(h.live_path()).unwrap();
    let upload = legacy_ledger(h.dir.path()).await;

    let result = h.backup.import(&tenant, "upload.db", &upload, "admin#1").await;

    assert!(matches!(result, Err(DomainError::Swap { .. })));
    assert_eq!(std::fs::read(h.live_path()).unwrap(), before);
    assert_eq!(h.repo.find_record(&tenant, 1).await.unwrap(), Some(original));
    assert_eq!(h.repo.find_record(&tenant, 11).await.unwrap(), None);
    assert!(h.staged_uploads().is_empty());
    assert!(h.stores.is_open(tenant.id).await);
}

#[tokio::test]
async fn test_failed_rollback_is_reported() {
    let h = Harness::with_file_system(Some(Arc::new(FaultyFileSystem::failing_on(vec![2, 3]))));
    let tenant = Harness::tenant();
    h.seed(1, "a@uni.edu").await;
    let upload = legacy_ledger(h.dir.path()).await;

    let result = h.backup.import(&tenant, "upload.db", &upload, "admin#1").await;

    assert!(matches!(result, Err(DomainError::RollbackFailed { .. })));
    assert!(h
        .audit
        .texts()
        .iter()
        .any(|line| line.starts_with("🚨 ROLLBACK FAILED during import by admin#1")));
}

#[tokio::test]
async fn test_import_into_fresh_tenant_creates_no_backup() {
    let h = Harness::new();
    let upload = legacy_ledger(h.dir.path()).await;

    let report = h
        .backup
        .import(&Harness::tenant(), "upload.db", &upload, "admin#1")
        .await
        .unwrap();

    assert_eq!(report.backup_path, None);
    assert_eq!(report.row_count, 2);
    assert!(h.live_path().exists());
    assert_eq!(h.backup.open_stores(), 1);
}

#[tokio::test]
async fn test_export_without_ledger_is_not_found() {
    let h = Harness::new();
    let result = h.backup.export(&Harness::tenant(), "admin#1").await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_import_waits_for_in_flight_reads() {
    let h = Arc::new(Harness::new());
    let tenant = Harness::tenant();
    h.seed(1, "a@uni.edu").await;
    let upload = legacy_ledger(h.dir.path()).await;

    let reader = h.gate.read(tenant.id).await;
    let import = {
        let h = Arc::clone(&h);
        let tenant = tenant.clone();
        tokio::spawn(async move { h.backup.import(&tenant, "upload.db", &upload, "admin#1").await })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!import.is_finished());
    assert!(h.repo.find_record(&tenant, 1).await.unwrap().is_some());

    drop(reader);
    let report = import.await.unwrap().unwrap();
    assert_eq!(report.row_count, 2);
    assert!(h.repo.find_record(&tenant, 11).await.unwrap().is_some());
}

#[tokio::test]
async fn test_import_without_key_is_rebuilt_and_accepts_upserts() {
    let h = Harness::new();
    let tenant = Harness::tenant();
    h.seed(1, "a@uni.edu").await;
    let bytes = unkeyed_ledger(h.dir.path()).await;

    let report = h.backup.import(&tenant, "unkeyed.db", &bytes, "admin#1").await.unwrap();
    assert_eq!(report.row_count, 2);

    let latest = h.repo.find_record(&tenant, 11).await.unwrap().unwrap();
    assert_eq!(latest.email, "latest@uni.edu");
    assert!(latest.verified);

    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    h.repo
        .upsert_verified(&tenant, &VerificationRecord::verified_now(99, "new@uni.edu", at))
        .await
        .unwrap();
    h.repo
        .upsert_verified(&tenant, &VerificationRecord::verified_now(11, "again@uni.edu", at))
        .await
        .unwrap();

    let records = h.repo.list_records(&tenant).await.unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r.user_id).collect();
    assert_eq!(ids, vec![11, 12, 99]);
    assert_eq!(records[0].email, "again@uni.edu");
}

#[tokio::test]
async fn test_renamed_tenant_exports_and_imports_the_live_file() {
    let h = Harness::new();
    let tenant = Harness::tenant();
    let renamed = Tenant::new(4242u64, "Guild Renamed");
    h.seed(1, "a@uni.edu").await;

    let export = h.backup.export(&renamed, "admin#1").await.unwrap();
    assert_eq!(export.bytes, std::fs::read(h.live_path()).unwrap());

    let upload = legacy_ledger(h.dir.path()).await;
    let report = h.backup.import(&renamed, "upload.db", &upload, "admin#1").await.unwrap();

    assert!(report
        .backup_path
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("Guild_One_4242_"));
    assert!(!h.stores.path_for(&renamed).exists());
    assert!(h.repo.find_record(&tenant, 11).await.unwrap().is_some());
    assert!(h.repo.find_record(&renamed, 11).await.unwrap().is_some());
    assert_eq!(h.repo.find_record(&renamed, 1).await.unwrap(), None);
}
