//! Domain entities representing core business objects.

pub mod audit;
pub mod pending_otp;
pub mod tenant;
pub mod verification_record;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use audit::AuditEvent;
pub use pending_otp::PendingOtp;
pub use tenant::{Tenant, TenantId, VerificationRequest};
pub use verification_record::VerificationRecord;
