use serde::{Deserialize, Serialize};
use validator::Validate;

use gg_core::domain::entities::{Tenant, TenantId, VerificationRequest};
use gg_core::domain::value_objects::{RoleGrant, StartOutcome, VerificationState};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartVerificationRequest {
    /// Display name of the tenant, used for its ledger file name
    #[validate(length(min = 1, max = 100))]
    pub tenant_name: String,

    pub user_id: u64,

    /// How the user is named in audit lines, e.g. `alice#0001`
    #[validate(length(min = 1, max = 100))]
    pub user_label: String,

    #[validate(length(min = 3, max = 254))]
    pub email: String,
}

impl StartVerificationRequest {
    pub fn to_request(&self, tenant_id: u64) -> VerificationRequest {
        VerificationRequest::new(
            Tenant::new(TenantId(tenant_id), self.tenant_name.clone()),
            self.user_id,
            self.user_label.clone(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckCodeRequest {
    #[validate(length(min = 1, max = 100))]
    pub tenant_name: String,

    pub user_id: u64,

    #[validate(length(min = 1, max = 100))]
    pub user_label: String,

    #[validate(length(min = 1, max = 32))]
    pub code: String,
}

impl CheckCodeRequest {
    pub fn to_request(&self, tenant_id: u64) -> VerificationRequest {
        VerificationRequest::new(
            Tenant::new(TenantId(tenant_id), self.tenant_name.clone()),
            self.user_id,
            self.user_label.clone(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StateQuery {
    #[validate(length(min = 1, max = 100))]
    pub tenant_name: String,

    pub user_id: u64,
}

impl StateQuery {
    pub fn to_request(&self, tenant_id: u64) -> VerificationRequest {
        let user_label = self.user_id.to_string();
        VerificationRequest::new(
            Tenant::new(TenantId(tenant_id), self.tenant_name.clone()),
            self.user_id,
            user_label,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartVerificationResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: StartOutcome,
}

impl From<StartOutcome> for StartVerificationResponse {
    fn from(outcome: StartOutcome) -> Self {
        Self {
            message: outcome.message().to_string(),
            outcome,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckCodeResponse {
    pub message: String,
    pub email: String,
    pub role: RoleGrant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    pub user_id: u64,
    pub state: VerificationState,
}
