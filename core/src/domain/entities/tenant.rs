//! Tenant identity and the request envelope every front-end builds.

use serde::{Deserialize, Serialize};
use std::fmt;

use gg_shared::utils::safe_name;

/// Numeric identifier of a tenant (a chat-platform guild)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub u64);

impl TenantId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TenantId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A workspace with its own ledger and OTP state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Platform identifier, stable across renames
    pub id: TenantId,

    /// Display name at the time of the request
    pub name: String,
}

impl Tenant {
    pub fn new(id: impl Into<TenantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Display name with every character outside `[A-Za-z0-9_-]` replaced by `_`
    pub fn safe_name(&self) -> String {
        safe_name(&self.name)
    }

    /// Storage key `{safe_name}_{id}`, the stem of the tenant's ledger file
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.safe_name(), self.id)
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// One user acting inside one tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub tenant: Tenant,

    /// Platform user identifier, primary key of the ledger row
    pub user_id: u64,

    /// Display string used in audit lines only
    pub user_label: String,
}

impl VerificationRequest {
    pub fn new(tenant: Tenant, user_id: u64, user_label: impl Into<String>) -> Self {
        Self {
            tenant,
            user_id,
            user_label: user_label.into(),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant.id
    }
}
