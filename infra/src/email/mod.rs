//! Email Delivery Module
//!
//! Adapters implementing the core `EmailServiceTrait`:
//!
//! - **Mailgun**: production delivery through the Mailgun messages API
//! - **Console**: logs messages instead of sending them, for development
//!
//! Recipient addresses are masked in every log line.

use std::sync::Arc;

use gg_core::services::verification::EmailServiceTrait;
use gg_shared::{EmailConfig, EmailProvider};

use crate::InfrastructureError;

pub mod console;
pub mod mailgun;

pub use console::ConsoleEmailService;
pub use mailgun::MailgunEmailService;

#[cfg(test)]
mod tests;

/// Create the email adapter selected by configuration
pub fn create_email_service(
    config: &EmailConfig,
) -> Result<Arc<dyn EmailServiceTrait>, InfrastructureError> {
    match config.provider {
        EmailProvider::Console => {
            tracing::warn!("Using console email service - codes are logged, not sent");
            Ok(Arc::new(ConsoleEmailService::new()))
        }
        EmailProvider::Mailgun => Ok(Arc::new(MailgunEmailService::new(config.clone())?)),
    }
}
