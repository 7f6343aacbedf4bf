//! HTTP front-end for the GuildGate verification gate
//!
//! Exposes the verification workflow and the ledger backup manager over
//! actix-web. The binary in `main.rs` wires real adapters; tests build the
//! same app over mock collaborators.

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{create_app, AppState};
