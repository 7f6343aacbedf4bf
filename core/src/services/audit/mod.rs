//! Audit service module for posting verification events to a tenant's audit channel.

mod service;
mod traits;

pub use service::{AuditService, AuditServiceConfig};
pub use traits::{AuditChannelError, AuditChannelTrait};
