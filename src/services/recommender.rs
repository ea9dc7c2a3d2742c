//! Content-based movie recommendations.
//!
//! The engine fits a TF-IDF index over every movie's searchable text and ranks
//! the corpus by cosine similarity to a free-text query built from the
//! requested actor, genres and director. Ties on similarity fall back to
//! rating, then popularity, then corpus order.
//!
//! The index is rebuilt wholesale, and only when the corpus differs from the
//! snapshot it was last fit on. State sits behind a single `RwLock`: training
//! takes the write half, ranking the read half.

use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::MovieStore,
    error::{AppError, RecommendError},
    models::{Movie, MovieCriterion, MovieQuery, RecommendationRecord, RecommendedMovie},
    services::{
        fetcher::{CatalogFetcher, FetchStatus},
        tfidf::{SparseVector, TfidfVectorizer},
    },
};

/// Number of movies returned per recommendation
pub const TOP_K: usize = 10;

type EngineResult<T> = Result<T, RecommendError>;

/// Outcome of a training pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainOutcome {
    /// A new index was fit over this many movies
    Trained { movies: usize },
    /// The corpus matched the last snapshot; the index was kept
    Unchanged,
    /// The corpus is empty; the engine is untrained
    NoData,
}

#[derive(Debug, Clone, PartialEq)]
struct TrainedIndex {
    /// Corpus the index was fit on, used to detect staleness
    snapshot: Vec<Movie>,
    vectorizer: TfidfVectorizer,
    /// One vector per snapshot movie, same order
    vectors: Vec<SparseVector>,
}

impl TrainedIndex {
    fn fit(movies: Vec<Movie>) -> Self {
        let documents: Vec<String> = movies.iter().map(Movie::searchable_text).collect();
        let (vectorizer, vectors) = TfidfVectorizer::fit_transform(&documents);
        Self {
            snapshot: movies,
            vectorizer,
            vectors,
        }
    }

    fn rank(&self, query_text: &str, limit: usize) -> Vec<RecommendedMovie> {
        let query_vector = self.vectorizer.transform(query_text);

        let mut scored: Vec<(&Movie, f64)> = self
            .snapshot
            .iter()
            .zip(&self.vectors)
            .map(|(movie, vector)| (movie, query_vector.cosine_similarity(vector)))
            .collect();

        // sort_by is stable, so full ties keep corpus order
        scored.sort_by(|(a, a_score), (b, b_score)| compare_ranked(*a_score, a, *b_score, b));

        scored
            .into_iter()
            .take(limit)
            .map(|(movie, score)| RecommendedMovie::from_movie(movie, score))
            .collect()
    }
}

/// Descending by match score, then rating, then popularity
fn compare_ranked(a_score: f64, a: &Movie, b_score: f64, b: &Movie) -> Ordering {
    b_score
        .total_cmp(&a_score)
        .then_with(|| b.rating.total_cmp(&a.rating))
        .then_with(|| b.popularity.total_cmp(&a.popularity))
}

#[derive(Debug, Default)]
enum EngineState {
    #[default]
    Untrained,
    Trained(TrainedIndex),
}

fn persistence_failure(err: AppError) -> RecommendError {
    RecommendError::PersistenceFailure(err.to_string())
}

pub struct RecommendationEngine {
    store: Arc<dyn MovieStore>,
    fetcher: Arc<dyn CatalogFetcher>,
    state: RwLock<EngineState>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn MovieStore>, fetcher: Arc<dyn CatalogFetcher>) -> Self {
        Self {
            store,
            fetcher,
            state: RwLock::new(EngineState::Untrained),
        }
    }

    pub async fn is_trained(&self) -> bool {
        matches!(*self.state.read().await, EngineState::Trained(_))
    }

    /// Rebuilds the index if the stored corpus changed since the last build
    pub async fn train(&self) -> EngineResult<TrainOutcome> {
        let mut state = self.state.write().await;

        let movies = self
            .store
            .fetch_all_movies()
            .await
            .map_err(persistence_failure)?;

        if movies.is_empty() {
            tracing::warn!("No movies in the store, recommendation model left untrained");
            *state = EngineState::Untrained;
            return Ok(TrainOutcome::NoData);
        }

        if let EngineState::Trained(index) = &*state {
            if index.snapshot == movies {
                tracing::debug!(movies = movies.len(), "Corpus unchanged, skipping retrain");
                return Ok(TrainOutcome::Unchanged);
            }
        }

        let count = movies.len();
        let index = TrainedIndex::fit(movies);

        tracing::info!(
            movies = count,
            vocabulary = index.vectorizer.vocabulary_size(),
            "Recommendation model trained"
        );

        *state = EngineState::Trained(index);
        Ok(TrainOutcome::Trained { movies: count })
    }

    /// Fetches catalog movies for the query's actor and director when the
    /// store has none, returning whether anything new was stored
    pub async fn ensure_data(&self, query: &MovieQuery) -> EngineResult<bool> {
        let mut fetched = false;

        for criterion in query.fetch_criteria() {
            let present = self
                .store
                .has_movies_matching(&criterion)
                .await
                .map_err(persistence_failure)?;
            if present {
                continue;
            }

            let (actor, director, name) = match &criterion {
                MovieCriterion::Actor(name) => (Some(name.clone()), None, name),
                MovieCriterion::Director(name) => (None, Some(name.clone()), name),
                MovieCriterion::Genre(_) => continue,
            };

            tracing::info!(criterion = %criterion, "No stored movies, fetching from catalog");

            match self.fetcher.fetch_and_store(actor, director).await {
                Ok(FetchStatus::NotFound) => {
                    return Err(RecommendError::NoMoviesFound(name.clone()));
                }
                Ok(FetchStatus::Stored(_)) => fetched = true,
                Ok(FetchStatus::AlreadyPresent) => {}
                Err(AppError::Database(e)) => {
                    return Err(RecommendError::PersistenceFailure(e.to_string()));
                }
                Err(e) => {
                    tracing::error!(error = %e, criterion = %criterion, "Catalog fetch failed");
                    return Err(RecommendError::UpstreamFetchFailure(e.to_string()));
                }
            }
        }

        Ok(fetched)
    }

    /// Ranks the current index against the query without touching the store
    pub async fn rank(&self, query: &MovieQuery) -> EngineResult<Vec<RecommendedMovie>> {
        let query_text = query.search_text();
        if query_text.trim().is_empty() {
            return Err(RecommendError::InvalidQuery(
                "Provide an actor, a director or at least one genre!".to_string(),
            ));
        }

        match &*self.state.read().await {
            EngineState::Untrained => Err(RecommendError::ModelNotReady),
            EngineState::Trained(index) => Ok(index.rank(&query_text, TOP_K)),
        }
    }

    /// Full request flow: validate, fetch missing data, retrain, rank, record
    pub async fn recommend(
        &self,
        query: &MovieQuery,
        username: &str,
    ) -> EngineResult<Vec<RecommendedMovie>> {
        if query.is_empty() {
            return Err(RecommendError::InvalidQuery(
                "Provide an actor, a director or at least one genre!".to_string(),
            ));
        }

        self.ensure_data(query).await?;
        self.train().await?;
        let results = self.rank(query).await?;

        let record = RecommendationRecord::new(username, query.clone(), results.clone());
        if let Err(e) = self.store.record_recommendation(&record).await {
            tracing::warn!(error = %e, username = %username, "Failed to record recommendation history");
        }

        tracing::info!(
            username = %username,
            results = results.len(),
            top_score = results.first().map(|r| r.match_score).unwrap_or(0.0),
            "Recommendations served"
        );

        Ok(results)
    }
}
