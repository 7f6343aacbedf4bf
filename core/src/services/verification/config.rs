//! Configuration for the verification workflow

use std::time::Duration;

use gg_shared::config::verification::DEFAULT_EMAIL_TIMEOUT_SECONDS;
use gg_shared::VerificationConfig;

use crate::services::otp::OtpConfig;

/// Subject line of the verification email
pub const EMAIL_SUBJECT: &str = "Verify your email address";

/// Configuration for the verification workflow
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Lower-cased domains allowed to verify
    pub allowed_domains: Vec<String>,
    /// Name of the role granted after verification
    pub verified_role_name: String,
    /// Code shape and timing
    pub otp: OtpConfig,
    /// Upper bound on one email delivery attempt
    pub email_timeout: Duration,
}

impl VerificationServiceConfig {
    pub fn new(allowed_domains: Vec<String>, verified_role_name: impl Into<String>) -> Self {
        Self {
            allowed_domains,
            verified_role_name: verified_role_name.into(),
            otp: OtpConfig::default(),
            email_timeout: Duration::from_secs(DEFAULT_EMAIL_TIMEOUT_SECONDS),
        }
    }

    /// Body of the verification email
    pub fn email_body(&self, code: &str) -> String {
        format!(
            "Your verification code is: {}\nExpires in {} minutes.",
            code,
            self.otp.ttl_seconds / 60
        )
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            allowed_domains: config.allowed_domains.clone(),
            verified_role_name: config.verified_role_name.clone(),
            otp: OtpConfig::from(config),
            email_timeout: Duration::from_secs(config.email_timeout_seconds),
        }
    }
}
