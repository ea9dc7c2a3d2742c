use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::{AuthUser, RequestId},
    services::FetchStatus,
};

#[derive(Debug, Deserialize)]
pub struct FetchMoviesRequest {
    #[serde(default)]
    pub actor: String,
}

/// Pulls an actor's movies from the catalog into the store
pub async fn fetch_movies(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AuthUser(username): AuthUser,
    Json(request): Json<FetchMoviesRequest>,
) -> AppResult<Json<Value>> {
    let actor = request.actor.trim().to_string();
    if actor.is_empty() {
        return Err(AppError::InvalidInput("Actor name is required!".to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        username = %username,
        actor = %actor,
        "Processing fetch request"
    );

    let status = state.fetcher.fetch_and_store(Some(actor.clone()), None).await?;

    match status {
        FetchStatus::NotFound => Err(AppError::NotFound(status.message(&actor))),
        FetchStatus::Stored(count) => Ok(Json(json!({
            "message": status.message(&actor),
            "stored": count,
        }))),
        FetchStatus::AlreadyPresent => Ok(Json(json!({
            "message": status.message(&actor),
            "stored": 0,
        }))),
    }
}
