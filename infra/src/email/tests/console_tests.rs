use std::time::Duration;

use gg_core::services::verification::EmailServiceTrait;
use gg_shared::EmailConfig;

use crate::email::{create_email_service, ConsoleEmailService};

#[tokio::test]
async fn test_console_service_always_succeeds() {
    let service = ConsoleEmailService::new();

    let status = service
        .send_email("a@uni.edu", "Verify", "Your code is 1234567890", Duration::from_secs(1))
        .await
        .unwrap();

    assert!(status.is_success());
    assert_eq!(service.delivered(), 1);
}

#[tokio::test]
async fn test_factory_selects_console() {
    let service = create_email_service(&EmailConfig::console()).unwrap();
    let status = service
        .send_email("a@uni.edu", "Verify", "body", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(status.status_code, 200);
}
