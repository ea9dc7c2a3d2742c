use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::{MovieStore, UserStore},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{AuthService, CatalogFetcher, RecommendationEngine},
};

pub mod auth;
pub mod health;
pub mod movies;
pub mod recommendations;

/// Shared application state, built once at startup and injected into handlers
pub struct AppState {
    pub movies: Arc<dyn MovieStore>,
    pub users: Arc<dyn UserStore>,
    pub fetcher: Arc<dyn CatalogFetcher>,
    pub engine: RecommendationEngine,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(
        movies: Arc<dyn MovieStore>,
        users: Arc<dyn UserStore>,
        fetcher: Arc<dyn CatalogFetcher>,
        auth: AuthService,
    ) -> Self {
        let engine = RecommendationEngine::new(movies.clone(), fetcher.clone());
        Self {
            movies,
            users,
            fetcher,
            engine,
            auth,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/check_db", get(health::check_db))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
        .route("/update_profile", post(auth::update_profile))
        .route("/fetch_movies", post(movies::fetch_movies))
        .route("/recommend", post(recommendations::recommend))
        .route("/history", get(recommendations::history))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}
