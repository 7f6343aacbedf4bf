//! Repository interfaces for durable state.

pub mod ledger;

pub use ledger::{LedgerRepository, MockLedgerRepository};
