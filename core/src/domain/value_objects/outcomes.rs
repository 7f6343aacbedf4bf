//! Results of the verification workflow's operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a registry lookup for a submitted code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpCheck {
    /// Code matched; the entry was removed
    Success { email: String },
    /// No code is pending for the user
    NotFound,
    /// Code had expired; the entry was removed
    Expired,
    /// Code did not match; the entry is kept
    Mismatch,
}

/// Result of `start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StartOutcome {
    /// A code was issued and handed to the email provider
    OtpSent {
        email: String,
        expires_at: DateTime<Utc>,
        resend_available_at: DateTime<Utc>,
    },
    /// A code was issued but delivery failed; the code stays valid
    DeliveryFailed {
        email: String,
        resend_available_at: DateTime<Utc>,
    },
    /// Ledger says verified and the role is already held
    AlreadyVerified,
    /// Ledger says verified and the missing role was granted again
    RoleRestored,
}

impl StartOutcome {
    /// Short message for the end user
    pub fn message(&self) -> &'static str {
        match self {
            Self::OtpSent { .. } => "OTP sent! Check your inbox and submit the code.",
            Self::DeliveryFailed { .. } => "Failed to send email.",
            Self::AlreadyVerified => "You are already verified.",
            Self::RoleRestored => "You were already verified, your role has been restored.",
        }
    }
}

/// How the verified role ended up on the member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleGrant {
    Granted,
    AlreadyHeld,
}

/// Result of a successful `check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    Verified { email: String, role: RoleGrant },
}

impl CheckOutcome {
    pub fn message(&self) -> &'static str {
        "Verification successful!"
    }
}

/// Observable position of a (tenant, user) in the verification state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Unverified,
    OtpIssued,
    Verified,
    RoleGranted,
}
