use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::{AuthUser, RequestId},
    models::{MovieQuery, RecommendationRecord, RecommendationResponse},
};

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    AuthUser(username): AuthUser,
    payload: Result<Json<MovieQuery>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Json(query) =
        payload.map_err(|e| AppError::InvalidInput(format!("Invalid request format: {}", e)))?;

    tracing::info!(
        request_id = %request_id,
        username = %username,
        actor = ?query.actor(),
        director = ?query.director(),
        genres = query.genres.len(),
        "Processing recommendation request"
    );

    let recommendations = state.engine.recommend(&query, &username).await?;

    Ok(Json(RecommendationResponse { recommendations }))
}

/// Returns the caller's recommendation history, newest first
pub async fn history(
    State(state): State<Arc<AppState>>,
    AuthUser(username): AuthUser,
) -> AppResult<Json<Vec<RecommendationRecord>>> {
    let records = state.movies.fetch_history(&username).await?;
    Ok(Json(records))
}
