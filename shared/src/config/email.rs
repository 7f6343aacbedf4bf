//! Email delivery configuration module

use serde::{Deserialize, Serialize};

use super::{required, string_or, EnvLookup};
use crate::errors::ConfigError;

/// Default Mailgun API base (US region)
pub const DEFAULT_MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";

/// Which email adapter delivers codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// Mailgun messages API
    Mailgun,
    /// Log messages instead of sending them (development)
    Console,
}

impl std::str::FromStr for EmailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mailgun" => Ok(EmailProvider::Mailgun),
            "console" | "mock" => Ok(EmailProvider::Console),
            other => Err(format!("Unknown email provider: {}", other)),
        }
    }
}

/// Email provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Selected provider
    pub provider: EmailProvider,
    /// API key (Mailgun private key)
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Sending domain registered with the provider
    pub domain: String,
    /// `From` header, e.g. `Verification <noreply@example.com>`
    pub from: String,
    /// Base URL of the provider API
    pub api_base: String,
}

impl EmailConfig {
    /// Console configuration for development and tests
    pub fn console() -> Self {
        Self {
            provider: EmailProvider::Console,
            api_key: String::new(),
            domain: "localhost".to_string(),
            from: "noreply@localhost".to_string(),
            api_base: DEFAULT_MAILGUN_API_BASE.to_string(),
        }
    }

    /// Load from `EMAIL_PROVIDER` (default `mailgun`) and the `MAILGUN_*` keys
    pub fn from_source(lookup: EnvLookup<'_>) -> Result<Self, ConfigError> {
        let provider: EmailProvider = string_or(lookup, "EMAIL_PROVIDER", "mailgun")
            .parse()
            .map_err(|message| ConfigError::Invalid {
                key: "EMAIL_PROVIDER".to_string(),
                message,
            })?;

        match provider {
            EmailProvider::Console => Ok(Self {
                from: string_or(lookup, "MAILGUN_FROM", "noreply@localhost"),
                ..Self::console()
            }),
            EmailProvider::Mailgun => Ok(Self {
                provider,
                api_key: required(lookup, "MAILGUN_API_KEY")?,
                domain: required(lookup, "MAILGUN_DOMAIN")?,
                from: required(lookup, "MAILGUN_FROM")?,
                api_base: string_or(lookup, "MAILGUN_API_BASE", DEFAULT_MAILGUN_API_BASE),
            }),
        }
    }
}
