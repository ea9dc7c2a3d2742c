use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::{MovieStore, UserStore},
    error::{AppError, AppResult},
    models::{Movie, MovieCriterion, ProfileUpdate, RecommendationRecord, User},
};

/// Process-local store used for development and tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Keyed by movie id so iteration order matches the Postgres `ORDER BY id`
    movies: BTreeMap<i64, Movie>,
    users: HashMap<String, User>,
    /// Append-only, in insertion order
    history: Vec<RecommendationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MovieStore for MemoryStore {
    async fn fetch_all_movies(&self) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.values().cloned().collect())
    }

    async fn has_movies_matching(&self, criterion: &MovieCriterion) -> AppResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.movies.values().any(|movie| criterion.matches(movie)))
    }

    async fn upsert_movies(&self, movies: &[Movie]) -> AppResult<usize> {
        let mut inner = self.inner.write().await;
        for movie in movies {
            inner.movies.insert(movie.id, movie.clone());
        }
        Ok(movies.len())
    }

    async fn count_movies(&self) -> AppResult<usize> {
        Ok(self.inner.read().await.movies.len())
    }

    async fn record_recommendation(&self, record: &RecommendationRecord) -> AppResult<()> {
        self.inner.write().await.history.push(record.clone());
        Ok(())
    }

    async fn fetch_history(&self, username: &str) -> AppResult<Vec<RecommendationRecord>> {
        let inner = self.inner.read().await;
        let mut records: Vec<RecommendationRecord> = inner
            .history
            .iter()
            .filter(|record| record.username == username)
            .cloned()
            .collect();
        records.reverse();
        // Stable sort keeps newest-inserted first among equal timestamps
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &User) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.username) {
            return Err(AppError::Conflict(format!(
                "Username {} is already taken",
                user.username
            )));
        }
        inner.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn find_user(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(username).cloned())
    }

    async fn update_preferences(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> AppResult<Option<User>> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.get_mut(username).map(|user| {
            update.apply(user);
            user.clone()
        }))
    }
}
