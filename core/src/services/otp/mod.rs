//! One-time passcode registry.
//!
//! Pending codes live in process memory only and are lost on restart;
//! the durable half of verification state is the ledger.

mod config;
mod registry;

pub use config::OtpConfig;
pub use registry::OtpRegistry;
