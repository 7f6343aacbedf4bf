//! Verification workflow configuration module

use serde::{Deserialize, Serialize};

use super::{parsed_or, required, string_or, EnvLookup};
use crate::errors::ConfigError;

/// Default number of digits in a one-time passcode
pub const DEFAULT_OTP_LENGTH: usize = 10;

/// Default lifetime of a one-time passcode
pub const DEFAULT_OTP_TTL_SECONDS: i64 = 600;

/// Default minimum interval between two codes for the same user
pub const DEFAULT_RESEND_COOLDOWN_SECONDS: i64 = 120;

/// Default upper bound on a single email delivery call
pub const DEFAULT_EMAIL_TIMEOUT_SECONDS: u64 = 10;

/// Default name of the audit channel
pub const DEFAULT_AUDIT_CHANNEL: &str = "verification-logs";

/// Verification workflow configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Lower-cased email domains allowed to verify
    pub allowed_domains: Vec<String>,

    /// Name of the platform role granted after verification
    pub verified_role_name: String,

    /// Number of digits in a code
    pub otp_length: usize,

    /// Seconds before a code expires
    pub otp_ttl_seconds: i64,

    /// Seconds before another code may be requested
    pub resend_cooldown_seconds: i64,

    /// Seconds before an email delivery attempt is abandoned
    pub email_timeout_seconds: u64,

    /// Name of the channel that receives audit lines
    pub audit_channel_name: String,
}

impl VerificationConfig {
    /// Create a configuration with default timings
    pub fn new(allowed_domains: Vec<String>, verified_role_name: impl Into<String>) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|domain| domain.trim().to_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect(),
            verified_role_name: verified_role_name.into(),
            otp_length: DEFAULT_OTP_LENGTH,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
            email_timeout_seconds: DEFAULT_EMAIL_TIMEOUT_SECONDS,
            audit_channel_name: DEFAULT_AUDIT_CHANNEL.to_string(),
        }
    }

    /// Load from `ALLOWED_EMAIL_DOMAINS`, `VERIFIED_ROLE_NAME` and the optional
    /// `OTP_LENGTH`, `OTP_TTL_SECONDS`, `OTP_RESEND_COOLDOWN_SECONDS`,
    /// `EMAIL_TIMEOUT_SECONDS`, `AUDIT_CHANNEL_NAME`
    pub fn from_source(lookup: EnvLookup<'_>) -> Result<Self, ConfigError> {
        let domains = required(lookup, "ALLOWED_EMAIL_DOMAINS")?;
        let mut config = Self::new(
            parse_domain_list(&domains),
            required(lookup, "VERIFIED_ROLE_NAME")?,
        );

        config.otp_length = parsed_or(lookup, "OTP_LENGTH", DEFAULT_OTP_LENGTH)?;
        config.otp_ttl_seconds = parsed_or(lookup, "OTP_TTL_SECONDS", DEFAULT_OTP_TTL_SECONDS)?;
        config.resend_cooldown_seconds = parsed_or(
            lookup,
            "OTP_RESEND_COOLDOWN_SECONDS",
            DEFAULT_RESEND_COOLDOWN_SECONDS,
        )?;
        config.email_timeout_seconds =
            parsed_or(lookup, "EMAIL_TIMEOUT_SECONDS", DEFAULT_EMAIL_TIMEOUT_SECONDS)?;
        config.audit_channel_name = string_or(lookup, "AUDIT_CHANNEL_NAME", DEFAULT_AUDIT_CHANNEL);

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the workflow cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_domains.is_empty() {
            return Err(ConfigError::Invalid {
                key: "ALLOWED_EMAIL_DOMAINS".to_string(),
                message: "at least one domain is required".to_string(),
            });
        }
        if !(4..=32).contains(&self.otp_length) {
            return Err(ConfigError::Invalid {
                key: "OTP_LENGTH".to_string(),
                message: "must be between 4 and 32".to_string(),
            });
        }
        if self.otp_ttl_seconds <= 0 {
            return Err(ConfigError::Invalid {
                key: "OTP_TTL_SECONDS".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.resend_cooldown_seconds < 0 {
            return Err(ConfigError::Invalid {
                key: "OTP_RESEND_COOLDOWN_SECONDS".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if self.email_timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "EMAIL_TIMEOUT_SECONDS".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Split a comma-separated domain list, lower-casing and dropping blanks
pub fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|domain| domain.trim().to_lowercase())
        .filter(|domain| !domain.is_empty())
        .collect()
}
