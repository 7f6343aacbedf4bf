//! Server configuration module

use serde::{Deserialize, Serialize};

use super::{parsed_or, string_or, EnvLookup};
use crate::errors::ConfigError;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Bearer token required on admin routes (export/import).
    /// Admin routes are disabled when unset.
    #[serde(default, skip_serializing)]
    pub admin_token: Option<String>,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
            admin_token: None,
            max_payload_size: default_max_payload_size(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Load from `SERVER_HOST`, `SERVER_PORT`, `ADMIN_TOKEN`, `MAX_UPLOAD_BYTES`
    pub fn from_source(lookup: EnvLookup<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: string_or(lookup, "SERVER_HOST", &defaults.host),
            port: parsed_or(lookup, "SERVER_PORT", defaults.port)?,
            admin_token: lookup("ADMIN_TOKEN")
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
            max_payload_size: parsed_or(lookup, "MAX_UPLOAD_BYTES", defaults.max_payload_size)?,
        })
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_max_payload_size() -> usize {
    25 * 1024 * 1024
}
