//! Request and response bodies

pub mod admin;
pub mod verification;

pub use admin::{ExportQuery, ImportQuery, ImportResponse};
pub use verification::{
    CheckCodeRequest, CheckCodeResponse, StartVerificationRequest, StartVerificationResponse,
    StateQuery, StateResponse,
};
