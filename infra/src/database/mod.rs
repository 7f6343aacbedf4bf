//! Database module - per-tenant SQLite stores using SQLx
//!
//! This module provides the durable half of verification state:
//! - Store multiplexer owning one connection pool per tenant
//! - Ledger repository implementation
//! - Backup/restore manager swapping whole ledger files

pub mod backup;
pub mod ledger_repository;
pub mod multiplexer;


// Re-export commonly used types
pub use backup::{BackupService, LedgerFileSystem, LocalFileSystem};
pub use ledger_repository::SqliteLedgerRepository;
pub use multiplexer::{ledger_schema, StoreHandle, StoreMultiplexer, LEDGER_COLUMNS};
