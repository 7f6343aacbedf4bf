//! Shared setup for route tests
#![allow(dead_code)]

use actix_web::web;
use std::sync::Arc;
use tempfile::TempDir;

use gg_api::AppState;
use gg_core::domain::entities::TenantId;
use gg_core::services::audit::{AuditChannelTrait, AuditService, AuditServiceConfig};
use gg_core::services::gate::TenantGate;
use gg_core::services::verification::mock::{MockAuditChannel, MockEmailService, MockPlatform};
use gg_core::services::verification::{VerificationServiceConfig, VerificationWorkflow};
use gg_infra::{BackupService, SqliteLedgerRepository, StoreMultiplexer};
use gg_shared::StorageConfig;

pub const TENANT: TenantId = TenantId(4242);
pub const TENANT_NAME: &str = "Test Guild";
pub const USER: u64 = 77;
pub const OTHER_USER: u64 = 78;
pub const ROLE_ID: u64 = 900;
pub const ADMIN_TOKEN: &str = "s3cret-admin";
pub const MAX_PAYLOAD: usize = 1024 * 1024;

pub struct TestContext {
    pub dir: TempDir,
    pub state: web::Data<AppState>,
    pub stores: Arc<StoreMultiplexer>,
    pub email: Arc<MockEmailService>,
    pub platform: Arc<MockPlatform>,
    pub audit: Arc<MockAuditChannel>,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let stores = Arc::new(StoreMultiplexer::new(StorageConfig::new(dir.path().join("guild_dbs"))));
        let gate = Arc::new(TenantGate::new());
        let email = Arc::new(MockEmailService::new());
        let platform = Arc::new(MockPlatform::with_role(TENANT, ROLE_ID, "Verified"));
        platform.add_member(TENANT, USER, vec![]);
        platform.add_member(TENANT, OTHER_USER, vec![]);
        let audit = Arc::new(MockAuditChannel::new());
        let audit_config = AuditServiceConfig {
            async_writes: false,
            ..AuditServiceConfig::default()
        };

        let workflow = VerificationWorkflow::new(
            Arc::new(SqliteLedgerRepository::new(Arc::clone(&stores))),
            Arc::clone(&email),
            Arc::clone(&platform),
            AuditService::new(Arc::clone(&audit), audit_config.clone()),
            VerificationServiceConfig::new(vec!["example.com".to_string()], "Verified"),
        )
        .with_gate(Arc::clone(&gate));

        let channel: Arc<dyn AuditChannelTrait> = audit.clone();
        let backup = BackupService::new(
            Arc::clone(&stores),
            gate,
            AuditService::new(channel, audit_config),
        );

        let state = web::Data::new(AppState::new(Arc::new(workflow), Arc::new(backup)));

        Self {
            dir,
            state,
            stores,
            email,
            platform,
            audit,
        }
    }

    pub fn code_for(&self, email: &str) -> String {
        self.email.last_code_for(email).unwrap()
    }
}

pub fn start_body(user_id: u64, email: &str) -> serde_json::Value {
    serde_json::json!({
        "tenant_name": TENANT_NAME,
        "user_id": user_id,
        "user_label": format!("user{}#0001", user_id),
        "email": email,
    })
}

pub fn check_body(user_id: u64, code: &str) -> serde_json::Value {
    serde_json::json!({
        "tenant_name": TENANT_NAME,
        "user_id": user_id,
        "user_label": format!("user{}#0001", user_id),
        "code": code,
    })
}

pub fn verify_uri(action: &str) -> String {
    format!("/api/v1/tenants/{}/verify/{}", TENANT, action)
}

pub fn admin_uri(action: &str, query: &str) -> String {
    format!("/api/v1/admin/tenants/{}/{}?{}", TENANT, action, query)
}
