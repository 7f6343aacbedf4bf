//! Trait for the audit channel collaborator

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::TenantId;

/// Why a line could not be posted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditChannelError {
    #[error("audit channel #{0} not found")]
    ChannelMissing(String),

    #[error("missing permission to send messages in #{0}")]
    CannotSend(String),

    #[error("audit transport error: {0}")]
    Transport(String),
}

/// Text channel inside a tenant that receives audit lines
#[async_trait]
pub trait AuditChannelTrait: Send + Sync {
    /// Post `line` to the channel named `channel` in `tenant`
    async fn append(&self, tenant: TenantId, channel: &str, line: &str) -> Result<(), AuditChannelError>;
}
