//! Durable ledger row, one per (tenant, user).

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Ledger entry proving a user verified an email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Platform user identifier (primary key within the tenant's store)
    pub user_id: u64,

    /// Lower-cased address last used to verify
    pub email: String,

    /// Whether the user completed verification
    pub verified: bool,

    /// When verification completed; imported rows may lack it
    pub verified_at: Option<DateTime<Utc>>,
}

impl VerificationRecord {
    /// Record written by a successful OTP completion
    pub fn verified_now(user_id: u64, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            email: email.into(),
            verified: true,
            verified_at: Some(now),
        }
    }

    /// Rebuild a record from the ledger's column values
    ///
    /// `verified_at` is stored as epoch seconds; values chrono cannot
    /// represent are treated as absent.
    pub fn from_columns(
        user_id: u64,
        email: Option<String>,
        verified: Option<i64>,
        verified_at: Option<i64>,
    ) -> Self {
        Self {
            user_id,
            email: email.unwrap_or_default(),
            verified: verified.unwrap_or(0) == 1,
            verified_at: verified_at.and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        }
    }

    /// `verified_at` as epoch seconds, the ledger's storage format
    pub fn verified_at_epoch(&self) -> Option<i64> {
        self.verified_at.map(|at| at.timestamp())
    }
}
