//! Application state and factory
//!
//! This module holds the shared services and builds the actix-web `App`
//! used by both the binary and the route tests.

use actix_web::{web, App, HttpResponse};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use gg_core::services::backup::LedgerBackupTrait;
use gg_core::services::verification::VerificationGateway;
use gg_shared::{error_codes, ErrorResponse};

use crate::config::{json_config, path_config, query_config};
use crate::middleware::AdminAuth;
use crate::routes::{admin, health, verification};

/// Application state that holds shared services
pub struct AppState {
    pub verification: Arc<dyn VerificationGateway>,
    pub ledger_admin: Arc<dyn LedgerBackupTrait>,
}

impl AppState {
    pub fn new(
        verification: Arc<dyn VerificationGateway>,
        ledger_admin: Arc<dyn LedgerBackupTrait>,
    ) -> Self {
        Self {
            verification,
            ledger_admin,
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
    admin_token: Option<String>,
    max_payload_size: usize,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .app_data(web::PayloadConfig::new(max_payload_size))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/tenants/{tenant_id}/verify")
                        .route("/start", web::post().to(verification::start))
                        .route("/check", web::post().to(verification::check))
                        .route("/state", web::get().to(verification::current_state)),
                )
                .service(
                    web::scope("/admin/tenants/{tenant_id}")
                        .wrap(AdminAuth::new(admin_token))
                        .route("/export", web::get().to(admin::export))
                        .route("/import", web::post().to(admin::import)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
