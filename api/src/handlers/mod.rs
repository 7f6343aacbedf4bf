//! Error translation shared by every route

pub mod error;

pub use error::{status_for, validation_error_response, ApiError};
