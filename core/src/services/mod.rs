//! Business services containing domain logic and use cases.

pub mod audit;
pub mod backup;
pub mod clock;
pub mod gate;
pub mod otp;
pub mod verification;

// Re-export commonly used types
pub use audit::{AuditChannelError, AuditChannelTrait, AuditService, AuditServiceConfig};
pub use backup::LedgerBackupTrait;
pub use clock::{Clock, SystemClock};
pub use gate::TenantGate;
pub use otp::{OtpConfig, OtpRegistry};
pub use verification::{
    EmailServiceTrait, PlatformServiceTrait, VerificationGateway, VerificationServiceConfig,
    VerificationWorkflow,
};
