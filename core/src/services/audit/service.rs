//! Audit service for recording verification and ledger events.
//!
//! Every event is logged through `tracing` and posted to the tenant's audit
//! channel. A missing channel or a failed post never fails the operation
//! that produced the event; it is logged locally instead.

use std::sync::Arc;

use gg_shared::config::verification::DEFAULT_AUDIT_CHANNEL;

use crate::domain::entities::{AuditEvent, Tenant};

use super::traits::AuditChannelTrait;

/// Configuration for the audit service
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    /// Name of the channel receiving audit lines
    pub channel_name: String,
    /// Whether to post in a background task instead of awaiting the post
    pub async_writes: bool,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_AUDIT_CHANNEL.to_string(),
            async_writes: true,
        }
    }
}

/// Service posting audit events for tenants
pub struct AuditService<A>
where
    A: AuditChannelTrait + ?Sized,
{
    channel: Arc<A>,
    config: AuditServiceConfig,
}

impl<A> AuditService<A>
where
    A: AuditChannelTrait + ?Sized + 'static,
{
    /// Create a new audit service
    pub fn new(channel: Arc<A>, config: AuditServiceConfig) -> Self {
        Self { channel, config }
    }

    /// Record an event for a tenant
    pub async fn record(&self, tenant: &Tenant, event: AuditEvent) {
        if event.is_failure() {
            tracing::warn!(
                tenant_id = %tenant.id,
                event = event.kind(),
                line = %event,
                "Audit event"
            );
        } else {
            tracing::info!(
                tenant_id = %tenant.id,
                event = event.kind(),
                line = %event,
                "Audit event"
            );
        }

        let channel = Arc::clone(&self.channel);
        let channel_name = self.config.channel_name.clone();
        let tenant = tenant.clone();
        let line = event.to_string();

        if self.config.async_writes {
            tokio::spawn(async move {
                post(channel.as_ref(), &tenant, &channel_name, &line).await;
            });
        } else {
            post(channel.as_ref(), &tenant, &channel_name, &line).await;
        }
    }
}

async fn post<A>(channel: &A, tenant: &Tenant, channel_name: &str, line: &str)
where
    A: AuditChannelTrait + ?Sized,
{
    if let Err(e) = channel.append(tenant.id, channel_name, line).await {
        tracing::warn!(
            tenant_id = %tenant.id,
            tenant_name = %tenant.name,
            channel = channel_name,
            error = %e,
            line = line,
            event = "audit_post_failed",
            "Could not post audit line, logged locally only"
        );
    }
}
