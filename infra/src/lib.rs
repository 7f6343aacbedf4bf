//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for GuildGate. It provides
//! concrete implementations of the core crate's collaborator traits.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: one SQLite ledger file per tenant behind a store
//!   multiplexer, the ledger repository, and the backup/restore manager
//! - **Email**: Mailgun delivery and a console adapter for development
//! - **Platform**: Discord REST adapter for roles, members and the audit channel

use gg_core::errors::DomainError;

/// Database module - per-tenant SQLite stores using SQLx
pub mod database;

/// Email delivery module
pub mod email;

/// Chat-platform module
pub mod platform;

#[cfg(test)]
pub(crate) mod test_server;

pub use database::{BackupService, LedgerFileSystem, LocalFileSystem, SqliteLedgerRepository, StoreMultiplexer};
pub use email::{create_email_service, ConsoleEmailService, MailgunEmailService};
pub use platform::DiscordRestPlatform;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A tenant's store could not be opened
    #[error("Store unavailable at {path}: {message}")]
    StoreUnavailable { path: String, message: String },

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected response from an external API
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Database(e) => DomainError::StorageUnavailable {
                message: e.to_string(),
            },
            InfrastructureError::StoreUnavailable { path, message } => {
                DomainError::StorageUnavailable {
                    message: format!("{}: {}", path, message),
                }
            }
            InfrastructureError::Io(e) => DomainError::Io {
                message: e.to_string(),
            },
            InfrastructureError::Http(e) => DomainError::PlatformTransient {
                message: e.to_string(),
            },
            InfrastructureError::UnexpectedResponse(message) => {
                DomainError::PlatformTransient { message }
            }
            InfrastructureError::Config(message) => DomainError::Internal { message },
        }
    }
}
