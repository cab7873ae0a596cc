/*
 * Responsibility
 * - GET /health (疎通用、認証なし)
 * - plan ストアへの ping 結果で 200 / 503 を返す
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.plans.backend_name();

    match state.plans.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok", "store": store}))),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "degraded", "store": store})),
        ),
    }
}
