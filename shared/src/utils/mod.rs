//! Common utility functions

pub mod email;
pub mod filename;

pub use email::{email_domain, is_allowed_email, mask_email, normalize_email};
pub use filename::safe_name;
