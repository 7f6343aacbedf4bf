//! Shared utilities and common types for the GuildGate server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and environment loading
//! - Error types and response structures
//! - Utility functions (email domain parsing, filesystem-safe names)

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, EmailConfig, EmailProvider, Environment, LogFormat, LoggingConfig, PlatformConfig,
    ServerConfig, StorageConfig, VerificationConfig,
};
pub use errors::{error_codes, ConfigError, ErrorResponse};
pub use types::ApiResponse;
pub use utils::{email, filename};
