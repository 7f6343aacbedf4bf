//! Shared fixture for workflow tests

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use crate::domain::entities::{Tenant, TenantId, VerificationRequest};
use crate::repositories::MockLedgerRepository;
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::clock::Clock;
use crate::services::verification::mock::{ManualClock, MockAuditChannel, MockEmailService, MockPlatform};
use crate::services::verification::{VerificationServiceConfig, VerificationWorkflow};

pub const TENANT_ID: TenantId = TenantId(4242);
pub const USER_ID: u64 = 77;
pub const ROLE_ID: u64 = 900;
pub const ROLE_NAME: &str = "Verified";

pub type TestWorkflow =
    VerificationWorkflow<MockLedgerRepository, MockEmailService, MockPlatform, MockAuditChannel>;

pub struct Fixture {
    pub ledger: Arc<MockLedgerRepository>,
    pub email: Arc<MockEmailService>,
    pub platform: Arc<MockPlatform>,
    pub audit: Arc<MockAuditChannel>,
    pub clock: Arc<ManualClock>,
    pub workflow: Arc<TestWorkflow>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(VerificationServiceConfig::new(
            vec!["example.com".to_string()],
            ROLE_NAME,
        ))
    }

    pub fn with_config(config: VerificationServiceConfig) -> Self {
        let ledger = Arc::new(MockLedgerRepository::new());
        let email = Arc::new(MockEmailService::new());
        let platform = Arc::new(MockPlatform::with_role(TENANT_ID, ROLE_ID, ROLE_NAME));
        platform.add_member(TENANT_ID, USER_ID, vec![]);
        let audit = Arc::new(MockAuditChannel::new());
        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));

        let audit_service = AuditService::new(
            Arc::clone(&audit),
            AuditServiceConfig {
                async_writes: false,
                ..Default::default()
            },
        );
        let workflow = VerificationWorkflow::new(
            Arc::clone(&ledger),
            Arc::clone(&email),
            Arc::clone(&platform),
            audit_service,
            config,
        )
        .with_clock(clock.clone());

        Self {
            ledger,
            email,
            platform,
            audit,
            clock,
            workflow: Arc::new(workflow),
        }
    }

    pub fn tenant() -> Tenant {
        Tenant::new(TENANT_ID, "Test Guild")
    }

    pub fn request() -> VerificationRequest {
        VerificationRequest::new(Self::tenant(), USER_ID, "alice#0001")
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn last_code(&self) -> String {
        self.email.last_code_for("alice@example.com").unwrap()
    }
}
