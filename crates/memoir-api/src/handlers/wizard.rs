//! Wizard session handlers.
//!
//! A session holds one draft on the server. Clients drive it with
//! [`WizardAction`]s and finally generate, save or export it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use memoir_core::WizardAction;

use super::{attachment, ExportQuery};
use crate::services::SessionView;
use crate::{ApiError, ApiJson, ApiPath, ApiQuery, AppState, RequireAuth};

/// Request body for opening a session.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    /// Existing record to edit; omitted for a new draft.
    pub record_id: Option<Uuid>,
}

/// Open a wizard session.
///
/// # Returns
/// - 201 Created with the session view
/// - 403 Forbidden / 404 Not Found when `recordId` is not accessible
pub async fn open_session(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    body: Option<ApiJson<OpenSessionRequest>>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let request = body.map(|ApiJson(b)| b).unwrap_or_default();
    let view = state.sessions.open(&principal, request.record_id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.get(id, &principal).await?))
}

pub async fn discard_session(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.discard(id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply one action to the session draft.
///
/// # Returns
/// - 200 OK with the updated session view
/// - 400 Bad Request if the action is malformed or rejected (unknown action
///   type, field path or style); the session is left unchanged
pub async fn apply_action(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(action): ApiJson<WizardAction>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.apply(id, &principal, action).await?))
}

pub async fn generate_story(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.generate(id, &principal).await?))
}

/// Persist the draft and return `{record, session}`.
pub async fn save_draft(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (record, session) = state.sessions.save(id, &principal).await?;
    Ok(Json(serde_json::json!({
        "record": record,
        "session": session,
    })))
}

pub async fn export_draft(
    State(state): State<AppState>,
    RequireAuth { principal }: RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let file = state.sessions.export(id, &principal, format).await?;
    Ok(attachment(file))
}
