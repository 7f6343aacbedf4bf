//! # GuildGate Core
//!
//! Core business logic and domain layer for the GuildGate verification gate.
//! This crate contains domain entities, the error taxonomy, the ledger
//! repository interface, collaborator traits and the services that drive
//! email verification: the OTP registry, the tenant lock gate, the
//! verification workflow and the audit service.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    AuditEvent, PendingOtp, Tenant, TenantId, VerificationRecord, VerificationRequest,
};
pub use domain::value_objects::{
    BotMember, CheckOutcome, DeliveryStatus, ImportReport, LedgerExport, OtpCheck, PlatformError,
    PlatformMember, PlatformRole, RoleAssignment, RoleGrant, StartOutcome, VerificationState,
};
pub use errors::{DomainError, DomainResult};
pub use repositories::{LedgerRepository, MockLedgerRepository};
pub use services::{
    AuditChannelError, AuditChannelTrait, AuditService, AuditServiceConfig, Clock,
    EmailServiceTrait, LedgerBackupTrait, OtpConfig, OtpRegistry, PlatformServiceTrait,
    SystemClock, TenantGate, VerificationGateway, VerificationServiceConfig,
    VerificationWorkflow,
};
