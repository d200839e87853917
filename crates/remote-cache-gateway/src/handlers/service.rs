//! Service-level handlers (status, telemetry events)

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// GET /v8/artifacts/status - Announce that remote caching is available
pub async fn status() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "enabled": true })))
}

/// POST /v8/artifacts/events - Accept usage telemetry
///
/// Best effort: the payload is ignored and the call never fails.
pub async fn events() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({})))
}
