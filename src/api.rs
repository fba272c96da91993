//! HTTP surface: health, check-in scoring and per-user history.

use std::sync::Arc;

use serde_json::json;
use shuttle_axum::axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::checkin::CheckIn;
use crate::engine::{Outcome, RitmoEngine};
use crate::error::EngineError;
use crate::history::HistoryRecord;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RitmoEngine>,
}

/// Build the service router over an engine.
pub fn router(engine: Arc<RitmoEngine>) -> Router {
    create_router(AppState { engine })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/checkin-ritmo", post(checkin_ritmo))
        .route("/history/{usuario_id}", get(user_history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Error body for every non-2xx response: `{"error": "..."}`.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InvalidCheckIn(inner) => ApiError::unprocessable(inner.to_string()),
            EngineError::StoreWrite(inner) => {
                error!(target: "ritmo", error = %inner, "check-in not persisted");
                ApiError::internal("failed to persist check-in history")
            }
        }
    }
}

async fn checkin_ritmo(
    State(state): State<AppState>,
    body: Result<Json<CheckIn>, JsonRejection>,
) -> Result<Json<Outcome>, ApiError> {
    // Malformed or mistyped payloads get the same shape as validation failures.
    let Json(checkin) = body.map_err(|rej| {
        warn!(target: "ritmo", error = %rej.body_text(), "rejected check-in payload");
        ApiError::unprocessable(rej.body_text())
    })?;

    let engine = state.engine.clone();
    let outcome = tokio::task::spawn_blocking(move || engine.evaluate(&checkin))
        .await
        .map_err(|e| ApiError::internal(format!("evaluation task failed: {e}")))??;

    Ok(Json(outcome))
}

async fn user_history(
    State(state): State<AppState>,
    Path(usuario_id): Path<String>,
) -> Result<Json<Vec<HistoryRecord>>, ApiError> {
    let engine = state.engine.clone();
    let records = tokio::task::spawn_blocking(move || engine.history_for(&usuario_id))
        .await
        .map_err(|e| ApiError::internal(format!("history task failed: {e}")))?;
    Ok(Json(records))
}
