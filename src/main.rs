use std::sync::Arc;
use std::time::Duration;

use cinerank_api::{
    config::{Config, StorageBackend},
    db::{self, Cache, MemoryStore, MovieStore, PgStore, UserStore},
    routes::{create_router, AppState},
    services::{
        catalog::TmdbClient, AuthService, MemorySessionStore, MovieFetcher, RedisSessionStore,
        SessionStore, TrainOutcome,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinerank_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client).await;

    let session_ttl = Duration::from_secs(config.session_ttl_secs);
    let (movies, users, sessions) = match config.storage {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database_url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Connected to Postgres and applied migrations");

            let store = Arc::new(PgStore::new(pool));
            let movies: Arc<dyn MovieStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            let sessions: Arc<dyn SessionStore> = Arc::new(RedisSessionStore::new(cache.clone()));
            (movies, users, sessions)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");

            let store = Arc::new(MemoryStore::new());
            let movies: Arc<dyn MovieStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
            (movies, users, sessions)
        }
    };

    let catalog = Arc::new(TmdbClient::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));
    let fetcher = Arc::new(MovieFetcher::new(movies.clone(), catalog));
    let auth = AuthService::new(users.clone(), sessions, session_ttl);

    let state = Arc::new(AppState::new(movies.clone(), users, fetcher, auth));

    tracing::info!(movies = movies.count_movies().await?, "Training recommendation model");
    match state.engine.train().await {
        Ok(TrainOutcome::NoData) => {
            tracing::warn!("Movie store is empty; movies will be fetched on demand")
        }
        Ok(outcome) => tracing::info!(outcome = ?outcome, "Recommendation model ready"),
        Err(e) => tracing::error!(error = %e, "Initial training failed"),
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_handle.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
