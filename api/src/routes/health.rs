use actix_web::{web, HttpResponse};
use chrono::Utc;

use gg_shared::types::response::HealthResponse;

use crate::app::AppState;

/// Handler for GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "guildgate".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        open_stores: state.ledger_admin.open_stores(),
        pending_codes: state.verification.pending_codes(),
        timestamp: Utc::now(),
    })
}
