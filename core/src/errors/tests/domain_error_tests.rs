//! Unit tests for domain error types

use gg_shared::error_codes;

use crate::errors::DomainError;

#[test]
fn test_user_facing_messages() {
    assert_eq!(DomainError::DomainNotAllowed.to_string(), "Email domain not allowed.");
    assert_eq!(
        DomainError::Cooldown { remaining_seconds: 45 }.to_string(),
        "Wait 45s before requesting another OTP."
    );
    assert_eq!(
        DomainError::OtpNotFound.to_string(),
        "No active verification. Use /verify again."
    );
    assert_eq!(DomainError::OtpExpired.to_string(), "Code expired.");
    assert_eq!(DomainError::OtpMismatch.to_string(), "Incorrect code.");
}

#[test]
fn test_validation_message_carries_reason() {
    let error = DomainError::Validation {
        reason: "missing users table".to_string(),
    };
    assert_eq!(error.to_string(), "Invalid database file: missing users table");
    assert_eq!(error.error_code(), error_codes::VALIDATION_ERROR);
}

#[test]
fn test_error_codes() {
    assert_eq!(DomainError::DomainNotAllowed.error_code(), "DOMAIN_NOT_ALLOWED");
    assert_eq!(
        DomainError::Cooldown { remaining_seconds: 1 }.error_code(),
        "RESEND_COOLDOWN"
    );
    assert_eq!(DomainError::HierarchyViolation.error_code(), "HIERARCHY_VIOLATION");
    assert_eq!(
        DomainError::RollbackFailed { reason: "x".to_string() }.error_code(),
        "ROLLBACK_FAILED"
    );
}

#[test]
fn test_recoverable_errors() {
    assert!(DomainError::OtpMismatch.is_recoverable());
    assert!(DomainError::Cooldown { remaining_seconds: 3 }.is_recoverable());
    assert!(!DomainError::OtpExpired.is_recoverable());
    assert!(!DomainError::PermissionDenied.is_recoverable());
}
