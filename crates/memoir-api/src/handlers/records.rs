//! Dashboard handlers: the caller's own autobiographies.

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use memoir_core::AutobiographyRecord;
use memoir_export::export_record;

use super::{attachment, ConfirmDeleteQuery, ExportQuery};
use crate::services::{DeleteScope, DeletionTicket};
use crate::{ApiError, ApiPath, ApiQuery, AppState, RequireAuth};

/// List the caller's autobiographies.
///
/// # Returns
/// - 200 OK with `{"autobiographies": [...]}`
/// - 503 Service Unavailable if no record store is configured
pub async fn list_autobiographies(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
) -> Result<Json<serde_json::Value>, ApiError> {
    let rows = state.listing.dashboard(&principal).await?;
    Ok(Json(serde_json::json!({ "autobiographies": rows })))
}

/// Fetch one autobiography. Owner or admin only.
pub async fn get_autobiography(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<AutobiographyRecord>, ApiError> {
    Ok(Json(state.lifecycle.get(id, &principal).await?))
}

/// Download a stored autobiography as PDF or DOCX.
///
/// # Returns
/// - 200 OK with the document as an attachment
/// - 400 Bad Request if the format is unknown or no story has been generated
pub async fn export_autobiography(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let record = state.lifecycle.get(id, &principal).await?;
    Ok(attachment(export_record(&record, format)?))
}

/// First step of deletion: issue a confirmation token.
pub async fn request_delete(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DeletionTicket>, ApiError> {
    let ticket = state
        .deletion
        .request_delete(id, &principal, DeleteScope::Owner)
        .await?;
    Ok(Json(ticket))
}

/// Second step of deletion: consume the token and remove the record.
///
/// # Returns
/// - 200 OK with the reloaded dashboard listing
/// - 400 Bad Request if `token` is missing
/// - 403 Forbidden if the token is unknown, expired or issued for another request
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ConfirmDeleteQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .deletion
        .confirm_delete(id, query.token.as_deref(), &principal)
        .await?;
    let rows = state.listing.dashboard(&principal).await?;
    Ok(Json(serde_json::json!({ "autobiographies": rows })))
}
