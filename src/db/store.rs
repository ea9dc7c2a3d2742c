//! Persistence contracts shared by the Postgres and in-memory backends.

use crate::{
    error::AppResult,
    models::{Movie, MovieCriterion, ProfileUpdate, RecommendationRecord, User},
};

/// The movie corpus and recommendation history
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    /// Full corpus ordered by movie id
    async fn fetch_all_movies(&self) -> AppResult<Vec<Movie>>;

    async fn has_movies_matching(&self, criterion: &MovieCriterion) -> AppResult<bool>;

    /// Inserts new movies and overwrites existing ones with the same id
    async fn upsert_movies(&self, movies: &[Movie]) -> AppResult<usize>;

    async fn count_movies(&self) -> AppResult<usize>;

    async fn record_recommendation(&self, record: &RecommendationRecord) -> AppResult<()>;

    /// History for one user, newest first
    async fn fetch_history(&self, username: &str) -> AppResult<Vec<RecommendationRecord>>;

    /// Cheap round trip used by the connectivity check
    async fn ping(&self) -> AppResult<()>;
}

/// Registered accounts
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken
    async fn create_user(&self, user: &User) -> AppResult<()>;

    async fn find_user(&self, username: &str) -> AppResult<Option<User>>;

    /// Returns the updated user, or `None` when it does not exist
    async fn update_preferences(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> AppResult<Option<User>>;
}
