//! Mailgun Email Service Implementation
//!
//! Sends plain-text messages through the Mailgun messages API:
//! `POST {api_base}/{domain}/messages` with HTTP basic auth (`api`, key)
//! and a form body of `from`, `to`, `subject` and `text`.
//!
//! The HTTP status is returned to the caller as-is; only a failure to get
//! any response (connect error, timeout) is reported as an error.

use async_trait::async_trait;
use std::time::Duration;

use gg_core::domain::value_objects::DeliveryStatus;
use gg_core::services::verification::EmailServiceTrait;
use gg_shared::email::mask_email;
use gg_shared::EmailConfig;

use crate::InfrastructureError;

/// Mailgun email service implementation
pub struct MailgunEmailService {
    client: reqwest::Client,
    config: EmailConfig,
}

impl MailgunEmailService {
    /// Create a new Mailgun email service
    pub fn new(config: EmailConfig) -> Result<Self, InfrastructureError> {
        if config.api_key.is_empty() {
            return Err(InfrastructureError::Config(
                "MAILGUN_API_KEY must not be empty".to_string(),
            ));
        }
        if config.domain.is_empty() {
            return Err(InfrastructureError::Config(
                "MAILGUN_DOMAIN must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder().build()?;

        tracing::info!(
            domain = %config.domain,
            api_base = %config.api_base,
            "Mailgun email service initialized"
        );

        Ok(Self { client, config })
    }

    /// Messages endpoint for the configured domain
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            self.config.domain
        )
    }
}

#[async_trait]
impl EmailServiceTrait for MailgunEmailService {
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        timeout: Duration,
    ) -> Result<DeliveryStatus, String> {
        let form = [
            ("from", self.config.from.as_str()),
            ("to", recipient),
            ("subject", subject),
            ("text", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    recipient = %mask_email(recipient),
                    error = %e,
                    timeout = e.is_timeout(),
                    event = "email_transport_failed",
                    "Mailgun request failed"
                );
                e.to_string()
            })?;

        let status = DeliveryStatus::new(response.status().as_u16());
        if status.is_success() {
            tracing::info!(
                recipient = %mask_email(recipient),
                status = status.status_code,
                event = "email_sent",
                "Verification email accepted by Mailgun"
            );
        } else {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                recipient = %mask_email(recipient),
                status = status.status_code,
                detail = %detail,
                event = "email_rejected",
                "Mailgun rejected the message"
            );
        }
        Ok(status)
    }
}
