//! Route handlers
//!
//! - `health` - liveness plus open-store and pending-code gauges
//! - `verification` - start, check and state for one user of one tenant
//! - `admin` - ledger export and import, behind the admin token

pub mod admin;
pub mod health;
pub mod verification;
