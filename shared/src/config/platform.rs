//! Chat-platform configuration module

use serde::{Deserialize, Serialize};

use super::{required, string_or, EnvLookup};
use crate::errors::ConfigError;

/// Default Discord REST API base
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Bot credentials for the chat platform
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformConfig {
    /// Bot token
    #[serde(default, skip_serializing)]
    pub bot_token: String,
    /// REST API base URL
    pub api_base: String,
}

impl PlatformConfig {
    /// Create a configuration for the default API base
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_DISCORD_API_BASE.to_string(),
        }
    }

    /// Load from `DISCORD_TOKEN` and `DISCORD_API_BASE`
    pub fn from_source(lookup: EnvLookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            bot_token: required(lookup, "DISCORD_TOKEN")?,
            api_base: string_or(lookup, "DISCORD_API_BASE", DEFAULT_DISCORD_API_BASE),
        })
    }
}
