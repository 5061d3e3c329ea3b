//! services/api/src/web/transfer.rs
//!
//! Full-state export and import, and the wipe of all stored data.

use crate::error::{to_http, HandlerError};
use crate::web::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use lumina_core::domain::ExportDocument;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ImportResponse {
    pub imported: usize,
}

#[utoipa::path(
    get,
    path = "/export",
    responses((status = 200, description = "Every book and the profile", body = ExportDocument))
)]
pub async fn export_handler(State(app_state): State<Arc<AppState>>) -> Json<ExportDocument> {
    let library = app_state.library.lock().await;
    Json(library.export(Utc::now()))
}

/// Replace the library with an export document. A document without a
/// `books` field is rejected and nothing changes.
#[utoipa::path(
    post,
    path = "/import",
    request_body = ExportDocument,
    responses(
        (status = 200, body = ImportResponse),
        (status = 400, description = "Malformed export document; nothing was changed")
    )
)]
pub async fn import_handler(
    State(app_state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportResponse>, HandlerError> {
    let mut library = app_state.library.lock().await;
    let imported = library.import_json(&body).await.map_err(to_http)?;
    Ok(Json(ImportResponse { imported }))
}

#[utoipa::path(
    delete,
    path = "/data",
    responses((status = 204, description = "All books and the profile removed"))
)]
pub async fn clear_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    let mut library = app_state.library.lock().await;
    library.clear_all().await.map_err(to_http)?;
    Ok(StatusCode::NO_CONTENT)
}
