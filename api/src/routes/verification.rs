//! Verification route handlers

use actix_web::{web, HttpResponse};
use validator::Validate;

use gg_core::domain::value_objects::CheckOutcome;
use gg_shared::email::mask_email;
use gg_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::{
    CheckCodeRequest, CheckCodeResponse, StartVerificationRequest, StartVerificationResponse,
    StateQuery, StateResponse,
};
use crate::handlers::{validation_error_response, ApiError};

/// Handler for POST /api/v1/tenants/{tenant_id}/verify/start
///
/// # Request Body
///
/// ```json
/// {
///     "tenant_name": "CS Society",
///     "user_id": 123456789,
///     "user_label": "alice#0001",
///     "email": "alice@example.edu"
/// }
/// ```
///
/// # Response
///
/// 200 with the outcome (`otp_sent`, `delivery_failed`, `already_verified`
/// or `role_restored`); 403 for a domain outside the allow-list; 429 with
/// `Retry-After` during the resend cooldown.
pub async fn start(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<StartVerificationRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = body.validate() {
        return Ok(validation_error_response(&errors));
    }

    let tenant_id = path.into_inner();
    let request = body.to_request(tenant_id);
    tracing::info!(
        tenant_id = tenant_id,
        user_id = request.user_id,
        email = %mask_email(&body.email),
        "Processing verify start"
    );

    let outcome = state.verification.start(&request, &body.email).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(StartVerificationResponse::from(outcome))))
}

/// Handler for POST /api/v1/tenants/{tenant_id}/verify/check
///
/// 200 once the code matched and the role is held; 400 for a wrong or
/// expired code; 404 when no code is pending.
pub async fn check(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<CheckCodeRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = body.validate() {
        return Ok(validation_error_response(&errors));
    }

    let request = body.to_request(path.into_inner());
    let outcome = state.verification.check(&request, &body.code).await?;

    let message = outcome.message().to_string();
    let CheckOutcome::Verified { email, role } = outcome;
    Ok(HttpResponse::Ok().json(ApiResponse::success(CheckCodeResponse {
        message,
        email,
        role,
    })))
}

/// Handler for GET /api/v1/tenants/{tenant_id}/verify/state
pub async fn current_state(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    query: web::Query<StateQuery>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_error_response(&errors));
    }

    let request = query.to_request(path.into_inner());
    let current = state.verification.state(&request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(StateResponse {
        user_id: request.user_id,
        state: current,
    })))
}
