//! Verification workflow module for email-based role gating
//!
//! This module provides the complete verification workflow:
//! - Allow-listed email domain validation
//! - OTP issuance with resend cooldown and delivery by email
//! - Code checking and durable ledger writes
//! - Role grant, and role restore for users verified earlier
//! - Audit lines for every transition

mod config;
pub mod mock;
mod traits;
mod workflow;

#[cfg(test)]
mod tests;

pub use config::{VerificationServiceConfig, EMAIL_SUBJECT};
pub use traits::{EmailServiceTrait, PlatformServiceTrait, VerificationGateway};
pub use workflow::VerificationWorkflow;
