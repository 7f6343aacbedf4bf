//! Bearer-token guard for administrative routes.
//!
//! Requests must carry `Authorization: Bearer <token>` matching the
//! configured admin token. Comparison is constant-time. When no token is
//! configured every request is refused, so the admin routes are off.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use gg_shared::{error_codes, ErrorResponse};

/// Admin authentication middleware factory
#[derive(Clone)]
pub struct AdminAuth {
    token: Option<Arc<str>>,
}

impl AdminAuth {
    /// Guard comparing against `token`; `None` refuses everything
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(Arc::from),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminAuthMiddleware {
            service: Rc::new(service),
            token: self.token.clone(),
        }))
    }
}

/// Admin authentication middleware service
pub struct AdminAuthMiddleware<S> {
    service: Rc<S>,
    token: Option<Arc<str>>,
}

impl<S, B> Service<ServiceRequest> for AdminAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let token = self.token.clone();

        Box::pin(async move {
            let Some(expected) = token else {
                tracing::warn!(path = %req.path(), event = "admin_disabled", "Admin route called but no admin token is configured");
                return Ok(reject(req, "Admin routes are disabled."));
            };

            match extract_bearer_token(&req) {
                Some(presented) if constant_time_eq::constant_time_eq(presented.as_bytes(), expected.as_bytes()) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                _ => {
                    tracing::warn!(path = %req.path(), event = "admin_unauthorized", "Rejected admin request");
                    Ok(reject(req, "Missing or invalid admin token."))
                }
            }
        })
    }
}

fn reject<B>(req: ServiceRequest, message: &str) -> ServiceResponse<EitherBody<B>> {
    let response = HttpResponse::Unauthorized()
        .json(ErrorResponse::new(error_codes::UNAUTHORIZED, message));
    req.into_response(response).map_into_right_body()
}

/// Token from an `Authorization: Bearer` header
pub fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
