//! Configuration for the OTP registry

use chrono::Duration;

use gg_shared::config::verification::{
    DEFAULT_OTP_LENGTH, DEFAULT_OTP_TTL_SECONDS, DEFAULT_RESEND_COOLDOWN_SECONDS,
};
use gg_shared::VerificationConfig;

/// Code shape and timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpConfig {
    /// Number of digits in a code
    pub code_length: usize,
    /// Lifetime of a code in seconds
    pub ttl_seconds: i64,
    /// Minimum seconds between two codes for the same key
    pub resend_cooldown_seconds: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_OTP_LENGTH,
            ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
        }
    }
}

impl OtpConfig {
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds)
    }

    pub fn resend_cooldown(&self) -> Duration {
        Duration::seconds(self.resend_cooldown_seconds)
    }
}

impl From<&VerificationConfig> for OtpConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            code_length: config.otp_length,
            ttl_seconds: config.otp_ttl_seconds,
            resend_cooldown_seconds: config.resend_cooldown_seconds,
        }
    }
}
