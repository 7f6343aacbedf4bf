//! Verification ledger repository module.

mod r#trait;
pub use r#trait::LedgerRepository;

pub mod mock;
pub use mock::MockLedgerRepository;

#[cfg(test)]
mod tests;
