//! Value objects representing immutable domain concepts.

pub mod backup;
pub mod outcomes;
pub mod platform;

// Re-export commonly used types
pub use backup::{ImportReport, LedgerExport};
pub use outcomes::{CheckOutcome, OtpCheck, RoleGrant, StartOutcome, VerificationState};
pub use platform::{BotMember, DeliveryStatus, PlatformError, PlatformMember, PlatformRole, RoleAssignment};
