use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures of the recommendation engine
///
/// None of these corrupt engine state; a failed call leaves the index and
/// history untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Recommendation model is not ready: no movies in the corpus")]
    ModelNotReady,

    #[error("No movies found for {0}")]
    NoMoviesFound(String),

    #[error("Movie catalog fetch failed: {0}")]
    UpstreamFetchFailure(String),

    #[error("Movie store unavailable: {0}")]
    PersistenceFailure(String),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Cache(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Recommend(err) => {
                let status = match err {
                    RecommendError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                    RecommendError::ModelNotReady => StatusCode::SERVICE_UNAVAILABLE,
                    RecommendError::NoMoviesFound(_) => StatusCode::NOT_FOUND,
                    RecommendError::UpstreamFetchFailure(_) => StatusCode::BAD_GATEWAY,
                    RecommendError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
