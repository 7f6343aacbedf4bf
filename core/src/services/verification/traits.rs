//! Traits for the email delivery and chat-platform collaborators

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::entities::{TenantId, VerificationRequest};
use crate::domain::value_objects::{
    BotMember, CheckOutcome, DeliveryStatus, PlatformError, PlatformMember, PlatformRole,
    RoleAssignment, StartOutcome, VerificationState,
};
use crate::errors::DomainResult;

/// Trait for transactional email delivery
#[async_trait]
pub trait EmailServiceTrait: Send + Sync {
    /// Send one message; a transport error is returned as `Err`, a provider
    /// rejection as a non-2xx `DeliveryStatus`
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        timeout: Duration,
    ) -> Result<DeliveryStatus, String>;
}

/// Trait for the chat platform's role and membership API
#[async_trait]
pub trait PlatformServiceTrait: Send + Sync {
    /// Look up a role by exact name
    async fn find_role(&self, tenant: TenantId, name: &str) -> Result<Option<PlatformRole>, PlatformError>;

    /// Look up a member; `None` if the user is not in the tenant
    async fn fetch_member(
        &self,
        tenant: TenantId,
        user_id: u64,
    ) -> Result<Option<PlatformMember>, PlatformError>;

    /// The gate's own membership; `None` if it is not in the tenant
    async fn bot_member(&self, tenant: TenantId) -> Result<Option<BotMember>, PlatformError>;

    /// Add a role to a member
    async fn assign_role(&self, tenant: TenantId, user_id: u64, role_id: u64, reason: &str) -> RoleAssignment;
}

/// Object-safe entry point front-ends use to drive verification
#[async_trait]
pub trait VerificationGateway: Send + Sync {
    /// Begin (or resume) verification with a candidate email
    async fn start(&self, request: &VerificationRequest, email: &str) -> DomainResult<StartOutcome>;

    /// Submit the code received by email
    async fn check(&self, request: &VerificationRequest, code: &str) -> DomainResult<CheckOutcome>;

    /// Current position in the verification state machine
    async fn state(&self, request: &VerificationRequest) -> DomainResult<VerificationState>;

    /// Number of codes waiting to be confirmed
    fn pending_codes(&self) -> usize;
}
