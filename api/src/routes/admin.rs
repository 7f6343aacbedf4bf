//! Ledger administration handlers

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use validator::Validate;

use gg_core::domain::entities::{Tenant, TenantId};
use gg_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::{ExportQuery, ImportQuery, ImportResponse};
use crate::handlers::{validation_error_response, ApiError};

/// Handler for GET /api/v1/admin/tenants/{tenant_id}/export
///
/// Streams the live ledger file as an attachment named
/// `verification_backup_{tenant_id}.db`.
pub async fn export(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    query: web::Query<ExportQuery>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_error_response(&errors));
    }

    let tenant = Tenant::new(TenantId(path.into_inner()), query.tenant_name.clone());
    let export = state.ledger_admin.export(&tenant, &query.actor).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export.filename)],
        })
        .body(export.bytes))
}

/// Handler for POST /api/v1/admin/tenants/{tenant_id}/import
///
/// The raw request body is the uploaded SQLite file. On success the
/// previous ledger has been kept as a backup and the new one is live.
pub async fn import(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    query: web::Query<ImportQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = query.validate() {
        return Ok(validation_error_response(&errors));
    }

    let tenant = Tenant::new(TenantId(path.into_inner()), query.tenant_name.clone());
    let report = state
        .ledger_admin
        .import(&tenant, &query.filename, &body, &query.actor)
        .await?;

    let backup_file = report
        .backup_path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().to_string());
    let message = if backup_file.is_some() {
        "Database imported safely. Backup created."
    } else {
        "Database imported safely."
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(ImportResponse {
        message: message.to_string(),
        row_count: report.row_count,
        backup_file,
    })))
}
