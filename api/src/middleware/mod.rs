//! Request middleware

pub mod admin;

pub use admin::AdminAuth;
