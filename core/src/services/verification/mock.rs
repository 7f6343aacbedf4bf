//! Mock collaborators for exercising the verification workflow.
//!
//! These are public so the infra and api crates can drive real services
//! against a scripted platform and mailbox in their own tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::entities::TenantId;
use crate::domain::value_objects::{
    BotMember, DeliveryStatus, PlatformError, PlatformMember, PlatformRole, RoleAssignment,
};
use crate::services::audit::{AuditChannelError, AuditChannelTrait};
use crate::services::clock::Clock;

use super::traits::{EmailServiceTrait, PlatformServiceTrait};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Message captured by [`MockEmailService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl SentEmail {
    /// The first run of digits in the body, i.e. the code
    pub fn code(&self) -> Option<String> {
        self.body
            .split(|c: char| !c.is_ascii_digit())
            .find(|run| run.len() >= 4)
            .map(str::to_string)
    }
}

/// Mailbox that records every message instead of sending it
pub struct MockEmailService {
    sent: Mutex<Vec<SentEmail>>,
    status_code: Mutex<u16>,
    transport_error: Mutex<Option<String>>,
    delay: Mutex<Option<std::time::Duration>>,
}

impl MockEmailService {
    /// Mailbox answering every send with 200
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            status_code: Mutex::new(200),
            transport_error: Mutex::new(None),
            delay: Mutex::new(None),
        }
    }

    /// Status returned by subsequent sends
    pub fn set_status_code(&self, status_code: u16) {
        *lock(&self.status_code) = status_code;
    }

    /// Make subsequent sends fail at the transport level
    pub fn set_transport_error(&self, error: Option<String>) {
        *lock(&self.transport_error) = error;
    }

    /// Sleep before answering, to trip the caller's timeout
    pub fn set_delay(&self, delay: Option<std::time::Duration>) {
        *lock(&self.delay) = delay;
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        lock(&self.sent).clone()
    }

    /// Code in the most recent message to `recipient`
    pub fn last_code_for(&self, recipient: &str) -> Option<String> {
        lock(&self.sent)
            .iter()
            .rev()
            .find(|email| email.recipient == recipient)
            .and_then(SentEmail::code)
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailServiceTrait for MockEmailService {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        _timeout: std::time::Duration,
    ) -> Result<DeliveryStatus, String> {
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = lock(&self.transport_error).clone() {
            return Err(error);
        }

        lock(&self.sent).push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(DeliveryStatus::new(*lock(&self.status_code)))
    }
}

#[derive(Default)]
struct PlatformState {
    roles: HashMap<TenantId, Vec<PlatformRole>>,
    members: HashMap<(TenantId, u64), PlatformMember>,
    bots: HashMap<TenantId, BotMember>,
    assign_result: Option<RoleAssignment>,
    lookup_error: Option<PlatformError>,
    assignments: Vec<(TenantId, u64, u64, String)>,
}

/// Scriptable chat platform
///
/// Successful assignments are applied to the stored member, so a later
/// lookup sees the new role.
#[derive(Default)]
pub struct MockPlatform {
    state: Mutex<PlatformState>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tenant with a role named `role_name`, a bot that can manage it, and no members
    pub fn with_role(tenant: TenantId, role_id: u64, role_name: &str) -> Self {
        let platform = Self::new();
        platform.add_role(tenant, role_id, role_name, 1);
        platform.set_bot(
            tenant,
            BotMember {
                can_manage_roles: true,
                top_role_position: 10,
            },
        );
        platform
    }

    pub fn add_role(&self, tenant: TenantId, role_id: u64, name: &str, position: i64) {
        lock(&self.state)
            .roles
            .entry(tenant)
            .or_default()
            .push(PlatformRole {
                id: role_id,
                name: name.to_string(),
                position,
            });
    }

    pub fn remove_roles(&self, tenant: TenantId) {
        lock(&self.state).roles.remove(&tenant);
    }

    pub fn add_member(&self, tenant: TenantId, user_id: u64, role_ids: Vec<u64>) {
        lock(&self.state)
            .members
            .insert((tenant, user_id), PlatformMember { user_id, role_ids });
    }

    /// Take a role away, as an admin would by hand
    pub fn strip_role(&self, tenant: TenantId, user_id: u64, role_id: u64) {
        if let Some(member) = lock(&self.state).members.get_mut(&(tenant, user_id)) {
            member.role_ids.retain(|id| *id != role_id);
        }
    }

    pub fn set_bot(&self, tenant: TenantId, bot: BotMember) {
        lock(&self.state).bots.insert(tenant, bot);
    }

    /// Force the result of the next assignments; `None` restores normal behavior
    pub fn set_assign_result(&self, result: Option<RoleAssignment>) {
        lock(&self.state).assign_result = result;
    }

    /// Make every lookup fail
    pub fn set_lookup_error(&self, error: Option<PlatformError>) {
        lock(&self.state).lookup_error = error;
    }

    /// Every successful assignment as (tenant, user, role, reason)
    pub fn assignments(&self) -> Vec<(TenantId, u64, u64, String)> {
        lock(&self.state).assignments.clone()
    }

    pub fn member_has_role(&self, tenant: TenantId, user_id: u64, role_id: u64) -> bool {
        lock(&self.state)
            .members
            .get(&(tenant, user_id))
            .map(|member| member.has_role(role_id))
            .unwrap_or(false)
    }

    fn check_lookup(&self) -> Result<(), PlatformError> {
        match lock(&self.state).lookup_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlatformServiceTrait for MockPlatform {
    async fn find_role(&self, tenant: TenantId, name: &str) -> Result<Option<PlatformRole>, PlatformError> {
        self.check_lookup()?;
        Ok(lock(&self.state)
            .roles
            .get(&tenant)
            .and_then(|roles| roles.iter().find(|role| role.name == name).cloned()))
    }

    async fn fetch_member(
        &self,
        tenant: TenantId,
        user_id: u64,
    ) -> Result<Option<PlatformMember>, PlatformError> {
        self.check_lookup()?;
        Ok(lock(&self.state).members.get(&(tenant, user_id)).cloned())
    }

    async fn bot_member(&self, tenant: TenantId) -> Result<Option<BotMember>, PlatformError> {
        self.check_lookup()?;
        Ok(lock(&self.state).bots.get(&tenant).copied())
    }

    async fn assign_role(&self, tenant: TenantId, user_id: u64, role_id: u64, reason: &str) -> RoleAssignment {
        let mut state = lock(&self.state);
        if let Some(result) = state.assign_result.clone() {
            if result != RoleAssignment::Success {
                return result;
            }
        }
        match state.members.get_mut(&(tenant, user_id)) {
            Some(member) => {
                if !member.role_ids.contains(&role_id) {
                    member.role_ids.push(role_id);
                }
            }
            None => return RoleAssignment::TransientError("unknown member".to_string()),
        }
        state
            .assignments
            .push((tenant, user_id, role_id, reason.to_string()));
        RoleAssignment::Success
    }
}

/// Audit channel that keeps every posted line
#[derive(Default)]
pub struct MockAuditChannel {
    lines: Mutex<Vec<(TenantId, String, String)>>,
    failure: Mutex<Option<AuditChannelError>>,
}

impl MockAuditChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent posts fail
    pub fn set_failure(&self, failure: Option<AuditChannelError>) {
        *lock(&self.failure) = failure;
    }

    /// Posted lines as (tenant, channel, line)
    pub fn lines(&self) -> Vec<(TenantId, String, String)> {
        lock(&self.lines).clone()
    }

    /// Just the text of the posted lines
    pub fn texts(&self) -> Vec<String> {
        lock(&self.lines).iter().map(|(_, _, line)| line.clone()).collect()
    }
}

#[async_trait]
impl AuditChannelTrait for MockAuditChannel {
    async fn append(&self, tenant: TenantId, channel: &str, line: &str) -> Result<(), AuditChannelError> {
        if let Some(failure) = lock(&self.failure).clone() {
            return Err(failure);
        }
        lock(&self.lines).push((tenant, channel.to_string(), line.to_string()));
        Ok(())
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *lock(&self.now) = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}
