//! HTTP surface.
//!
//! - `GET  /`       service info
//! - `GET  /health` liveness
//! - `POST /batch`  run one batch through the pipeline

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use veilbatch_types::{
    BatchMetadata, BatchSettlement, EncryptedVolumes, ErrorKind, VeilBatchError,
};

use crate::pipeline::BatchOutcome;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = state.body_limit_bytes;
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/batch", post(submit_batch))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "startedAt": state.started_at.to_rfc3339(),
        "publicMetadata": state.public_metadata.as_ref(),
        "mode": state.mode.to_string(),
        "attestation": state.attestation_scheme().to_string(),
    }))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchResponse {
    ok: bool,
    settlement: BatchSettlement,
    encrypted_volumes: EncryptedVolumes,
    attestation: String,
    metadata: BatchMetadata,
}

impl From<BatchOutcome> for BatchResponse {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            ok: true,
            attestation: outcome.attestation.to_hex(),
            settlement: outcome.settlement,
            encrypted_volumes: outcome.encrypted_volumes,
            metadata: outcome.metadata,
        }
    }
}

async fn submit_batch(State(state): State<AppState>, body: Bytes) -> Response {
    let payload = match parse_body(&body) {
        Ok(payload) => payload,
        Err(e) => return error_response(&e),
    };

    match state.pipeline.execute(&payload).await {
        Ok(outcome) => (StatusCode::OK, Json(BatchResponse::from(outcome))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// An empty body is treated as `null` so it fails validation like any
/// other non-object.
fn parse_body(body: &[u8]) -> Result<Value, VeilBatchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| VeilBatchError::schema("", format!("Invalid JSON: {e}")))
}

fn error_response(err: &VeilBatchError) -> Response {
    match err {
        VeilBatchError::SchemaViolation { issues } => {
            tracing::debug!(issues = issues.len(), "batch rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "ok": false,
                    "message": "Invalid payload",
                    "issues": issues,
                })),
            )
                .into_response()
        }
        _ if err.kind() == ErrorKind::Upstream => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ok": false, "message": err.to_string() })),
        )
            .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "message": "Batch execution failed" })),
        )
            .into_response(),
    }
}
