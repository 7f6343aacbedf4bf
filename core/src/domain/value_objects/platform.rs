//! Values exchanged with the email and chat-platform collaborators.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status returned by the email provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatus {
    pub status_code: u16,
}

impl DeliveryStatus {
    pub fn new(status_code: u16) -> Self {
        Self { status_code }
    }

    /// Only a 2xx status counts as delivered
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Role as seen by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRole {
    pub id: u64,
    pub name: String,
    /// Hierarchy position; higher outranks lower
    pub position: i64,
}

/// Member of a tenant with the ids of the roles they hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMember {
    pub user_id: u64,
    pub role_ids: Vec<u64>,
}

impl PlatformMember {
    pub fn has_role(&self, role_id: u64) -> bool {
        self.role_ids.contains(&role_id)
    }
}

/// The gate's own membership in a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMember {
    /// Manage-roles (or administrator) permission
    pub can_manage_roles: bool,
    /// Position of the bot's highest role
    pub top_role_position: i64,
}

/// Result of a role assignment call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleAssignment {
    Success,
    Forbidden,
    TransientError(String),
}

/// Platform lookup failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("platform refused the request")]
    Forbidden,

    #[error("platform error: {0}")]
    Transient(String),
}
