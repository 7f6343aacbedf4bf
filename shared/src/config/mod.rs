//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `email` - Transactional email provider credentials
//! - `environment` - Environment detection and logging configuration
//! - `platform` - Chat-platform bot credentials
//! - `server` - HTTP server and admin access
//! - `storage` - Where tenant ledgers and backups live on disk
//! - `verification` - Allowed domains, verified role, OTP timings
//!
//! Every loader reads through a key lookup function so that tests can feed a
//! map instead of mutating the process environment.

pub mod email;
pub mod environment;
pub mod platform;
pub mod server;
pub mod storage;
pub mod verification;


use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ConfigError;

pub use email::{EmailConfig, EmailProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use platform::PlatformConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;
pub use verification::VerificationConfig;

/// Lookup function used by every `from_source` loader
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Ledger storage configuration
    pub storage: StorageConfig,

    /// Verification workflow configuration
    pub verification: VerificationConfig,

    /// Email delivery configuration
    pub email: EmailConfig,

    /// Chat-platform configuration
    pub platform: PlatformConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Callers that support `.env` files load them before calling this.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_source(lookup: EnvLookup<'_>) -> Result<Self, ConfigError> {
        let environment = lookup("ENVIRONMENT")
            .map(|value| value.parse::<Environment>())
            .transpose()
            .map_err(|message| ConfigError::Invalid {
                key: "ENVIRONMENT".to_string(),
                message,
            })?
            .unwrap_or_default();

        Ok(Self {
            environment,
            server: ServerConfig::from_source(lookup)?,
            storage: StorageConfig::from_source(lookup),
            verification: VerificationConfig::from_source(lookup)?,
            email: EmailConfig::from_source(lookup)?,
            platform: PlatformConfig::from_source(lookup)?,
            logging: LoggingConfig::from_source(lookup, environment)?,
        })
    }
}

/// Read a required, non-empty value
pub(crate) fn required(lookup: EnvLookup<'_>, key: &str) -> Result<String, ConfigError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(key.to_string())),
    }
}

/// Read an optional value, falling back to `default`
pub(crate) fn string_or(lookup: EnvLookup<'_>, key: &str, default: &str) -> String {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse an optional value, falling back to `default` when unset
pub(crate) fn parsed_or<T>(lookup: EnvLookup<'_>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            message: e.to_string(),
        }),
        _ => Ok(default),
    }
}
