pub mod auth;
pub mod catalog;
pub mod fetcher;
pub mod recommender;
pub mod tfidf;

pub use auth::{AuthService, MemorySessionStore, RedisSessionStore, SessionStore};
pub use fetcher::{CatalogFetcher, FetchStatus, MovieFetcher};
pub use recommender::{RecommendationEngine, TrainOutcome};
