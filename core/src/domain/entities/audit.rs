//! Audit events posted to a tenant's audit channel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event worth telling a tenant's administrators about
///
/// The `Display` form is the line posted to the audit channel; failures
/// and successes are both reported so admins see a superset of what
/// users see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEvent {
    DomainRejected { user: String, email: String },
    OtpSent { user: String, email: String },
    DeliveryFailed { user: String },
    OtpExpired { user: String },
    OtpMismatch { user: String },
    Verified { user: String, email: String },
    RoleRestored { user: String },
    RoleGrantFailed { user: String, reason: String },
    LedgerExported { actor: String },
    LedgerImported { actor: String, rows: u64 },
    LedgerImportFailed { actor: String, reason: String },
    RollbackFailed { actor: String, reason: String },
}

impl AuditEvent {
    /// Stable identifier used as the `event` field in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DomainRejected { .. } => "domain_rejected",
            Self::OtpSent { .. } => "otp_sent",
            Self::DeliveryFailed { .. } => "delivery_failed",
            Self::OtpExpired { .. } => "otp_expired",
            Self::OtpMismatch { .. } => "otp_mismatch",
            Self::Verified { .. } => "verified",
            Self::RoleRestored { .. } => "role_restored",
            Self::RoleGrantFailed { .. } => "role_grant_failed",
            Self::LedgerExported { .. } => "ledger_exported",
            Self::LedgerImported { .. } => "ledger_imported",
            Self::LedgerImportFailed { .. } => "ledger_import_failed",
            Self::RollbackFailed { .. } => "rollback_failed",
        }
    }

    /// Whether the event records something going wrong
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::DomainRejected { .. }
                | Self::DeliveryFailed { .. }
                | Self::OtpExpired { .. }
                | Self::OtpMismatch { .. }
                | Self::RoleGrantFailed { .. }
                | Self::LedgerImportFailed { .. }
                | Self::RollbackFailed { .. }
        )
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomainRejected { user, email } => {
                write!(f, "🚫 {} tried invalid domain: {}", user, email)
            }
            Self::OtpSent { user, email } => write!(f, "📨 OTP sent to {} for {}", email, user),
            Self::DeliveryFailed { user } => write!(f, "❌ Email delivery failed for {}", user),
            Self::OtpExpired { user } => write!(f, "⌛ OTP expired for {}", user),
            Self::OtpMismatch { user } => write!(f, "❌ Wrong OTP from {}", user),
            Self::Verified { user, email } => write!(f, "✅ {} verified with {}", user, email),
            Self::RoleRestored { user } => write!(f, "♻️ Restored verified role for {}", user),
            Self::RoleGrantFailed { user, reason } => {
                write!(f, "⚠️ Could not grant the verified role to {}: {}", user, reason)
            }
            Self::LedgerExported { actor } => {
                write!(f, "📤 {} exported the verification database.", actor)
            }
            Self::LedgerImported { actor, rows } => write!(
                f,
                "📥 {} safely replaced the verification database ({} rows).",
                actor, rows
            ),
            Self::LedgerImportFailed { actor, reason } => {
                write!(f, "❌ Database import by {} failed: {}", actor, reason)
            }
            Self::RollbackFailed { actor, reason } => write!(
                f,
                "🚨 ROLLBACK FAILED during import by {}, operator action required: {}",
                actor, reason
            ),
        }
    }
}
