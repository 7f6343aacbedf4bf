//! Domain error taxonomy.
//!
//! The `Display` form of every variant is the short message shown to the
//! end user; `error_code` gives a stable machine-readable code for API
//! responses.

use thiserror::Error;

use gg_shared::error_codes;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Email domain not allowed.")]
    DomainNotAllowed,

    #[error("Wait {remaining_seconds}s before requesting another OTP.")]
    Cooldown { remaining_seconds: i64 },

    #[error("No active verification. Use /verify again.")]
    OtpNotFound,

    #[error("Code expired.")]
    OtpExpired,

    #[error("Incorrect code.")]
    OtpMismatch,

    #[error("Verification storage is unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Invalid database file: {reason}")]
    Validation { reason: String },

    #[error("Import failed during replacement: {reason}")]
    Swap { reason: String },

    #[error("Rollback failed, operator action required: {reason}")]
    RollbackFailed { reason: String },

    #[error("Verified role not found. Contact an admin.")]
    RoleMissing,

    #[error("You are not a member of this server.")]
    MemberNotFound,

    #[error("Bot lacks Manage Roles permission.")]
    PermissionDenied,

    #[error("Bot cannot assign this role because it is higher than or equal to the bot's top role.")]
    HierarchyViolation,

    #[error("Platform error. Try again later. ({message})")]
    PlatformTransient { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Stable code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DomainNotAllowed => error_codes::DOMAIN_NOT_ALLOWED,
            Self::Cooldown { .. } => error_codes::RESEND_COOLDOWN,
            Self::OtpNotFound => error_codes::OTP_NOT_FOUND,
            Self::OtpExpired => error_codes::OTP_EXPIRED,
            Self::OtpMismatch => error_codes::OTP_MISMATCH,
            Self::StorageUnavailable { .. } => error_codes::STORAGE_UNAVAILABLE,
            Self::Validation { .. } => error_codes::VALIDATION_ERROR,
            Self::Swap { .. } => error_codes::SWAP_FAILED,
            Self::RollbackFailed { .. } => error_codes::ROLLBACK_FAILED,
            Self::RoleMissing => error_codes::ROLE_MISSING,
            Self::MemberNotFound => error_codes::MEMBER_NOT_FOUND,
            Self::PermissionDenied => error_codes::PERMISSION_DENIED,
            Self::HierarchyViolation => error_codes::HIERARCHY_VIOLATION,
            Self::PlatformTransient { .. } => error_codes::PLATFORM_UNAVAILABLE,
            Self::NotFound { .. } => error_codes::NOT_FOUND,
            Self::Io { .. } => error_codes::IO_ERROR,
            Self::Internal { .. } => error_codes::INTERNAL_ERROR,
        }
    }

    /// Whether the user can succeed by retrying the same operation later
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Cooldown { .. } | Self::OtpMismatch | Self::PlatformTransient { .. }
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
