//! Console email service for development

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gg_core::domain::value_objects::DeliveryStatus;
use gg_core::services::verification::EmailServiceTrait;
use gg_shared::email::mask_email;

/// Email service that writes messages to the log
///
/// The body, code included, is logged at info level. Never select this
/// adapter in production.
#[derive(Debug, Default)]
pub struct ConsoleEmailService {
    delivered: AtomicUsize,
}

impl ConsoleEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages "sent" so far
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EmailServiceTrait for ConsoleEmailService {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        _timeout: Duration,
    ) -> Result<DeliveryStatus, String> {
        tracing::info!(
            recipient = %mask_email(recipient),
            subject = subject,
            body = body,
            event = "email_logged",
            "[console email] message not sent"
        );
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(DeliveryStatus::new(200))
    }
}
