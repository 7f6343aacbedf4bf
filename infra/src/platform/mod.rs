//! Chat-platform module
//!
//! REST adapter giving the verification workflow roles and members, and
//! the audit service a text channel to post to.

pub mod discord;

pub use discord::{compute_bot_member, DiscordRestPlatform, RoleInfo};

#[cfg(test)]
mod tests;
