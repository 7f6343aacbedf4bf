//! Mapping of domain errors to HTTP responses
//!
//! The body is always an [`ErrorResponse`] whose `error` is the domain
//! error's stable code and whose `message` is the user-facing text.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use validator::ValidationErrors;

use gg_core::errors::DomainError;
use gg_shared::{error_codes, ErrorResponse};

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::DomainNotAllowed => StatusCode::FORBIDDEN,
        DomainError::Cooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
        DomainError::OtpNotFound => StatusCode::NOT_FOUND,
        DomainError::OtpExpired | DomainError::OtpMismatch => StatusCode::BAD_REQUEST,
        DomainError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::RoleMissing
        | DomainError::PermissionDenied
        | DomainError::HierarchyViolation => StatusCode::CONFLICT,
        DomainError::MemberNotFound | DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::PlatformTransient { .. } => StatusCode::BAD_GATEWAY,
        DomainError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Swap { .. }
        | DomainError::RollbackFailed { .. }
        | DomainError::Io { .. }
        | DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Domain error on its way out of a handler
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DomainError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(&self.0)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, code = self.0.error_code(), "Request failed");
        } else {
            tracing::debug!(error = %self.0, code = self.0.error_code(), "Request rejected");
        }

        let mut body = ErrorResponse::new(self.0.error_code(), self.0.to_string());
        let mut response = HttpResponse::build(status);

        if let DomainError::Cooldown { remaining_seconds } = &self.0 {
            body = body.add_detail("retry_after_seconds", remaining_seconds);
            response.insert_header((header::RETRY_AFTER, remaining_seconds.to_string()));
        }

        response.json(body)
    }
}

/// 400 response listing the failing fields
pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    let mut body = ErrorResponse::new(error_codes::BAD_REQUEST, "Invalid request data.");
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        body = body.add_detail(field, messages);
    }
    HttpResponse::BadRequest().json(body)
}
