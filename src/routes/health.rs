use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Verifies the movie store is reachable
pub async fn check_db(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.movies.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Database is connected!" })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Database connectivity check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Database connection failed!" })),
            )
        }
    }
}
