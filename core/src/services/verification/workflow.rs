//! Verification workflow implementation

use async_trait::async_trait;
use std::sync::Arc;

use gg_shared::utils::{is_allowed_email, mask_email, normalize_email};

use crate::domain::entities::{AuditEvent, Tenant, VerificationRecord, VerificationRequest};
use crate::domain::value_objects::{
    CheckOutcome, OtpCheck, PlatformError, RoleAssignment, RoleGrant, StartOutcome,
    VerificationState,
};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::LedgerRepository;
use crate::services::audit::{AuditChannelTrait, AuditService};
use crate::services::clock::{Clock, SystemClock};
use crate::services::gate::TenantGate;
use crate::services::otp::OtpRegistry;

use super::config::{VerificationServiceConfig, EMAIL_SUBJECT};
use super::traits::{EmailServiceTrait, PlatformServiceTrait, VerificationGateway};

const GRANT_REASON: &str = "User completed email verification";
const RESTORE_REASON: &str = "Restoring verified role";

/// State machine driving a (tenant, user) from unverified to holding the verified role
///
/// ```text
/// Unverified --start--> OtpIssued --check--> Verified --grant--> RoleGranted
///                                                \____ restore (start) ___/
/// ```
///
/// All operations on one (tenant, user) key are serialized through the
/// [`TenantGate`]; the gate is shared with the ledger backup manager so an
/// import never swaps a store underneath a running operation.
pub struct VerificationWorkflow<L, E, P, A>
where
    L: LedgerRepository + ?Sized,
    E: EmailServiceTrait + ?Sized,
    P: PlatformServiceTrait + ?Sized,
    A: AuditChannelTrait + ?Sized,
{
    /// Durable per-tenant ledger
    ledger: Arc<L>,
    /// Email delivery collaborator
    email: Arc<E>,
    /// Chat-platform collaborator
    platform: Arc<P>,
    /// Audit line sink
    audit: AuditService<A>,
    /// In-flight codes
    otps: Arc<OtpRegistry>,
    /// Tenant and user locks
    gate: Arc<TenantGate>,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Workflow configuration
    config: VerificationServiceConfig,
}

impl<L, E, P, A> VerificationWorkflow<L, E, P, A>
where
    L: LedgerRepository + ?Sized,
    E: EmailServiceTrait + ?Sized,
    P: PlatformServiceTrait + ?Sized,
    A: AuditChannelTrait + ?Sized + 'static,
{
    /// Create a new verification workflow
    ///
    /// The workflow starts with its own tenant gate and the system clock;
    /// `with_gate` and `with_clock` replace them.
    pub fn new(
        ledger: Arc<L>,
        email: Arc<E>,
        platform: Arc<P>,
        audit: AuditService<A>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            ledger,
            email,
            platform,
            audit,
            otps: Arc::new(OtpRegistry::new(config.otp.clone())),
            gate: Arc::new(TenantGate::new()),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Share a tenant gate with other services touching the same stores
    pub fn with_gate(mut self, gate: Arc<TenantGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn registry(&self) -> &Arc<OtpRegistry> {
        &self.otps
    }

    /// Begin verification with a candidate email
    ///
    /// This method:
    /// 1. Consults the ledger; a verified user goes to the restore branch
    ///    and never receives a new code
    /// 2. Rejects addresses outside the allow-listed domains
    /// 3. Issues a code, subject to the resend cooldown
    /// 4. Sends the code by email, bounded by the configured timeout
    ///
    /// A failed or timed-out delivery still leaves the issued code valid;
    /// the outcome reports `DeliveryFailed` so the user knows to retry
    /// after the cooldown.
    ///
    /// # Errors
    ///
    /// * `DomainNotAllowed` - the email domain is not allow-listed
    /// * `Cooldown` - a code was sent less than the cooldown ago
    /// * `StorageUnavailable` - the tenant's ledger cannot be opened
    /// * any grant error from the restore branch
    pub async fn start_verification(
        &self,
        request: &VerificationRequest,
        raw_email: &str,
    ) -> DomainResult<StartOutcome> {
        let tenant = &request.tenant;
        let email = normalize_email(raw_email);
        let _guard = self.gate.lock_user(tenant.id, request.user_id).await;

        tracing::info!(
            tenant_id = %tenant.id,
            user_id = request.user_id,
            email = %mask_email(&email),
            event = "verification_started",
            "User is attempting to verify"
        );

        if let Some(record) = self.ledger.find_record(tenant, request.user_id).await? {
            if record.verified {
                return self.restore_or_confirm(request).await;
            }
        }

        if !is_allowed_email(&email, &self.config.allowed_domains) {
            self.audit
                .record(
                    tenant,
                    AuditEvent::DomainRejected {
                        user: request.user_label.clone(),
                        email: email.clone(),
                    },
                )
                .await;
            return Err(DomainError::DomainNotAllowed);
        }

        let now = self.clock.now();
        let pending = self.otps.issue(tenant.id, request.user_id, &email, now)?;
        let resend_available_at = pending.resend_available_at(self.config.otp.resend_cooldown());

        match self.deliver(&email, &pending.code).await {
            Ok(()) => {
                tracing::info!(
                    tenant_id = %tenant.id,
                    user_id = request.user_id,
                    email = %mask_email(&email),
                    event = "otp_sent",
                    "Verification code sent"
                );
                self.audit
                    .record(
                        tenant,
                        AuditEvent::OtpSent {
                            user: request.user_label.clone(),
                            email: email.clone(),
                        },
                    )
                    .await;
                Ok(StartOutcome::OtpSent {
                    email,
                    expires_at: pending.expires_at,
                    resend_available_at,
                })
            }
            Err(reason) => {
                tracing::warn!(
                    tenant_id = %tenant.id,
                    user_id = request.user_id,
                    email = %mask_email(&email),
                    error = %reason,
                    event = "otp_delivery_failed",
                    "Verification code could not be delivered"
                );
                self.audit
                    .record(
                        tenant,
                        AuditEvent::DeliveryFailed {
                            user: request.user_label.clone(),
                        },
                    )
                    .await;
                Ok(StartOutcome::DeliveryFailed {
                    email,
                    resend_available_at,
                })
            }
        }
    }

    /// Check a submitted code and, on a match, record the user as verified
    /// and grant the verified role
    ///
    /// The ledger write happens before the grant, so a user whose grant
    /// fails is still verified and gets the role through the restore branch
    /// of the next `start`.
    pub async fn check_code(
        &self,
        request: &VerificationRequest,
        code: &str,
    ) -> DomainResult<CheckOutcome> {
        let tenant = &request.tenant;
        let _guard = self.gate.lock_user(tenant.id, request.user_id).await;
        let now = self.clock.now();

        let email = match self.otps.check(tenant.id, request.user_id, code, now) {
            OtpCheck::Success { email } => email,
            OtpCheck::NotFound => return Err(DomainError::OtpNotFound),
            OtpCheck::Expired => {
                self.audit
                    .record(
                        tenant,
                        AuditEvent::OtpExpired {
                            user: request.user_label.clone(),
                        },
                    )
                    .await;
                return Err(DomainError::OtpExpired);
            }
            OtpCheck::Mismatch => {
                self.audit
                    .record(
                        tenant,
                        AuditEvent::OtpMismatch {
                            user: request.user_label.clone(),
                        },
                    )
                    .await;
                return Err(DomainError::OtpMismatch);
            }
        };

        let record = VerificationRecord::verified_now(request.user_id, email.clone(), now);
        if let Err(e) = self.ledger.upsert_verified(tenant, &record).await {
            tracing::error!(
                tenant_id = %tenant.id,
                user_id = request.user_id,
                error = %e,
                event = "ledger_write_failed",
                "Code matched but the ledger write failed"
            );
            return Err(e);
        }

        tracing::info!(
            tenant_id = %tenant.id,
            user_id = request.user_id,
            email = %mask_email(&email),
            event = "user_verified",
            "User verified"
        );
        self.audit
            .record(
                tenant,
                AuditEvent::Verified {
                    user: request.user_label.clone(),
                    email: email.clone(),
                },
            )
            .await;

        let role = self.grant_audited(request, GRANT_REASON).await?;
        Ok(CheckOutcome::Verified { email, role })
    }

    /// Current position of a user in the state machine
    pub async fn current_state(&self, request: &VerificationRequest) -> DomainResult<VerificationState> {
        let tenant = &request.tenant;
        let _guard = self.gate.read(tenant.id).await;

        let verified = self
            .ledger
            .find_record(tenant, request.user_id)
            .await?
            .map(|record| record.verified)
            .unwrap_or(false);

        if verified {
            let role = self
                .platform
                .find_role(tenant.id, &self.config.verified_role_name)
                .await
                .map_err(platform_error)?;
            let member = self
                .platform
                .fetch_member(tenant.id, request.user_id)
                .await
                .map_err(platform_error)?;
            let holds_role = match (role, member) {
                (Some(role), Some(member)) => member.has_role(role.id),
                _ => false,
            };
            return Ok(if holds_role {
                VerificationState::RoleGranted
            } else {
                VerificationState::Verified
            });
        }

        let now = self.clock.now();
        if self.otps.pending(tenant.id, request.user_id, now).is_some() {
            Ok(VerificationState::OtpIssued)
        } else {
            Ok(VerificationState::Unverified)
        }
    }

    /// Drop expired codes; returns how many were removed
    pub fn purge_expired_codes(&self) -> usize {
        let purged = self.otps.purge_expired(self.clock.now());
        if purged > 0 {
            tracing::debug!(purged = purged, event = "otp_purged", "Purged expired codes");
        }
        purged
    }

    async fn restore_or_confirm(&self, request: &VerificationRequest) -> DomainResult<StartOutcome> {
        match self.grant_audited(request, RESTORE_REASON).await? {
            RoleGrant::AlreadyHeld => {
                tracing::info!(
                    tenant_id = %request.tenant.id,
                    user_id = request.user_id,
                    event = "already_verified",
                    "User is already verified"
                );
                Ok(StartOutcome::AlreadyVerified)
            }
            RoleGrant::Granted => {
                self.audit
                    .record(
                        &request.tenant,
                        AuditEvent::RoleRestored {
                            user: request.user_label.clone(),
                        },
                    )
                    .await;
                Ok(StartOutcome::RoleRestored)
            }
        }
    }

    async fn grant_audited(&self, request: &VerificationRequest, reason: &str) -> DomainResult<RoleGrant> {
        match self.grant_role(&request.tenant, request.user_id, reason).await {
            Ok(grant) => Ok(grant),
            Err(e) => {
                tracing::warn!(
                    tenant_id = %request.tenant.id,
                    user_id = request.user_id,
                    error = %e,
                    event = "role_grant_failed",
                    "Could not grant verified role"
                );
                self.audit
                    .record(
                        &request.tenant,
                        AuditEvent::RoleGrantFailed {
                            user: request.user_label.clone(),
                            reason: e.to_string(),
                        },
                    )
                    .await;
                Err(e)
            }
        }
    }

    /// Grant the verified role, failing closed on every precondition
    ///
    /// A member that already holds the role is left untouched.
    async fn grant_role(&self, tenant: &Tenant, user_id: u64, reason: &str) -> DomainResult<RoleGrant> {
        let role = self
            .platform
            .find_role(tenant.id, &self.config.verified_role_name)
            .await
            .map_err(platform_error)?
            .ok_or(DomainError::RoleMissing)?;

        let member = self
            .platform
            .fetch_member(tenant.id, user_id)
            .await
            .map_err(platform_error)?
            .ok_or(DomainError::MemberNotFound)?;

        if member.has_role(role.id) {
            return Ok(RoleGrant::AlreadyHeld);
        }

        let bot = self
            .platform
            .bot_member(tenant.id)
            .await
            .map_err(platform_error)?
            .ok_or_else(|| DomainError::Internal {
                message: "bot is not a member of this tenant".to_string(),
            })?;

        if !bot.can_manage_roles {
            return Err(DomainError::PermissionDenied);
        }
        if role.position >= bot.top_role_position {
            return Err(DomainError::HierarchyViolation);
        }

        match self.platform.assign_role(tenant.id, user_id, role.id, reason).await {
            RoleAssignment::Success => {
                tracing::info!(
                    tenant_id = %tenant.id,
                    user_id = user_id,
                    role_id = role.id,
                    event = "role_granted",
                    "Verified role granted"
                );
                Ok(RoleGrant::Granted)
            }
            RoleAssignment::Forbidden => Err(DomainError::PermissionDenied),
            RoleAssignment::TransientError(message) => Err(DomainError::PlatformTransient { message }),
        }
    }

    /// Hand a code to the email collaborator; any failure is returned as text
    async fn deliver(&self, email: &str, code: &str) -> Result<(), String> {
        let timeout = self.config.email_timeout;
        let body = self.config.email_body(code);
        let send = self.email.send_email(email, EMAIL_SUBJECT, &body, timeout);

        match tokio::time::timeout(timeout, send).await {
            Ok(Ok(status)) if status.is_success() => Ok(()),
            Ok(Ok(status)) => Err(format!("provider returned status {}", status.status_code)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(format!("delivery timed out after {}s", timeout.as_secs())),
        }
    }
}

fn platform_error(error: PlatformError) -> DomainError {
    match error {
        PlatformError::Forbidden => DomainError::PermissionDenied,
        PlatformError::Transient(message) => DomainError::PlatformTransient { message },
    }
}

#[async_trait]
impl<L, E, P, A> VerificationGateway for VerificationWorkflow<L, E, P, A>
where
    L: LedgerRepository + ?Sized,
    E: EmailServiceTrait + ?Sized,
    P: PlatformServiceTrait + ?Sized,
    A: AuditChannelTrait + ?Sized + 'static,
{
    async fn start(&self, request: &VerificationRequest, email: &str) -> DomainResult<StartOutcome> {
        self.start_verification(request, email).await
    }

    async fn check(&self, request: &VerificationRequest, code: &str) -> DomainResult<CheckOutcome> {
        self.check_code(request, code).await
    }

    async fn state(&self, request: &VerificationRequest) -> DomainResult<VerificationState> {
        self.current_state(request).await
    }

    fn pending_codes(&self) -> usize {
        self.otps.len()
    }
}
