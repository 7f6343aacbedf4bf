//! Unit tests for tenant, ledger record and pending code entities

use chrono::{Duration, TimeZone, Utc};

use crate::domain::entities::{PendingOtp, Tenant, VerificationRecord};

#[test]
fn test_storage_key_sanitizes_name() {
    let tenant = Tenant::new(42, "CS Society!");
    assert_eq!(tenant.safe_name(), "CS_Society_");
    assert_eq!(tenant.storage_key(), "CS_Society__42");
}

#[test]
fn test_storage_key_cannot_escape_directory() {
    let tenant = Tenant::new(7, "../../etc");
    assert!(!tenant.storage_key().contains('/'));
    assert!(!tenant.storage_key().contains('.'));
}

#[test]
fn test_record_from_columns() {
    let record = VerificationRecord::from_columns(
        9,
        Some("u@example.com".to_string()),
        Some(1),
        Some(1_700_000_000),
    );
    assert!(record.verified);
    assert_eq!(record.email, "u@example.com");
    assert_eq!(record.verified_at_epoch(), Some(1_700_000_000));
}

#[test]
fn test_record_from_columns_with_missing_values() {
    let record = VerificationRecord::from_columns(9, None, None, None);
    assert!(!record.verified);
    assert!(record.email.is_empty());
    assert!(record.verified_at.is_none());
}

#[test]
fn test_pending_otp_expiry_is_strict() {
    let now = Utc.timestamp_opt(1_000, 0).unwrap();
    let otp = PendingOtp::new("0123456789".to_string(), "u@example.com", now, Duration::seconds(600));

    assert!(!otp.is_expired(now + Duration::seconds(600)));
    assert!(otp.is_expired(now + Duration::seconds(601)));
}

#[test]
fn test_cooldown_remaining_rounds_up() {
    let now = Utc.timestamp_opt(1_000, 0).unwrap();
    let otp = PendingOtp::new("0123456789".to_string(), "u@example.com", now, Duration::seconds(600));
    let cooldown = Duration::seconds(120);

    assert_eq!(otp.cooldown_remaining(now, cooldown), Some(120));
    assert_eq!(otp.cooldown_remaining(now + Duration::milliseconds(500), cooldown), Some(120));
    assert_eq!(otp.cooldown_remaining(now + Duration::seconds(119), cooldown), Some(1));
    assert_eq!(otp.cooldown_remaining(now + Duration::seconds(120), cooldown), None);
    assert_eq!(otp.resend_available_at(cooldown), now + cooldown);
}
