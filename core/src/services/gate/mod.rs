//! Lock registry serializing work per tenant and per (tenant, user).

mod tenant_gate;

pub use tenant_gate::{TenantGate, TenantReadGuard, TenantWriteGuard, UserGuard};

#[cfg(test)]
mod tests;
