//! Health check handlers

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

/// Liveness probe
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe; verifies the database is reachable
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(|e| ApiError::Internal(format!("Database not ready: {e}")))?;

    Ok(Json(json!({ "status": "ready" })))
}
