//! Admin surface: every autobiography plus aggregate counters.

use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use super::ConfirmDeleteQuery;
use crate::services::{AdminView, DeleteScope, DeletionTicket};
use crate::{ApiError, ApiPath, ApiQuery, AppState, RequireAdmin};

pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin { principal }: RequireAdmin,
) -> Result<Json<AdminView>, ApiError> {
    Ok(Json(state.listing.admin(&principal).await?))
}

pub async fn request_delete(
    State(state): State<AppState>,
    RequireAdmin { principal }: RequireAdmin,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DeletionTicket>, ApiError> {
    let ticket = state
        .deletion
        .request_delete(id, &principal, DeleteScope::Admin)
        .await?;
    Ok(Json(ticket))
}

/// Confirm an admin deletion and return the reloaded admin view.
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireAdmin { principal }: RequireAdmin,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ConfirmDeleteQuery>,
) -> Result<Json<AdminView>, ApiError> {
    state
        .deletion
        .confirm_delete(id, query.token.as_deref(), &principal)
        .await?;
    Ok(Json(state.listing.admin(&principal).await?))
}
