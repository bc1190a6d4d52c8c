//! Router assembly and middleware.

use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::handlers::{admin, generate, health, records, wizard};
use crate::AppState;

/// Request bodies are JSON drafts; nothing legitimate comes close.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Generates UUIDv7 request IDs (time-ordered) for `x-request-id`.
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.allowed_origins.clone()))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health::health_check))
        // Generation contract used by the original web client
        .route("/api/generate", post(generate::generate))
        // Dashboard
        .route("/api/v1/autobiographies", get(records::list_autobiographies))
        .route(
            "/api/v1/autobiographies/:id",
            get(records::get_autobiography).delete(records::confirm_delete),
        )
        .route(
            "/api/v1/autobiographies/:id/export",
            get(records::export_autobiography),
        )
        .route(
            "/api/v1/autobiographies/:id/delete-request",
            post(records::request_delete),
        )
        // Wizard sessions
        .route("/api/v1/wizard", post(wizard::open_session))
        .route(
            "/api/v1/wizard/:id",
            get(wizard::get_session).delete(wizard::discard_session),
        )
        .route("/api/v1/wizard/:id/actions", post(wizard::apply_action))
        .route("/api/v1/wizard/:id/generate", post(wizard::generate_story))
        .route("/api/v1/wizard/:id/save", post(wizard::save_draft))
        .route("/api/v1/wizard/:id/export", get(wizard::export_draft))
        // Admin
        .route("/api/v1/admin/autobiographies", get(admin::list_all))
        .route(
            "/api/v1/admin/autobiographies/:id",
            axum::routing::delete(admin::confirm_delete),
        )
        .route(
            "/api/v1/admin/autobiographies/:id/delete-request",
            post(admin::request_delete),
        )
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(subsystem = "api", "Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}
