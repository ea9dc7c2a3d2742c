use std::fmt::Display;
use std::sync::Arc;

use crate::{
    db::MovieStore,
    error::{AppError, AppResult},
    models::{MovieCriterion, PersonRole},
    services::catalog::MovieCatalog,
};

/// Result of a fetch-and-store request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// The store already held movies for the person; nothing was fetched
    AlreadyPresent,
    /// This many movies were upserted
    Stored(usize),
    /// The catalog returned no movies
    NotFound,
}

impl FetchStatus {
    /// Human-readable status for the given person
    pub fn message(&self, name: &str) -> String {
        match self {
            FetchStatus::AlreadyPresent => format!("Movies for {} already exist!", name),
            FetchStatus::Stored(count) => {
                format!("Stored {} movies for {} successfully!", count, name)
            }
            FetchStatus::NotFound => format!("No movies found for {}", name),
        }
    }
}

impl Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::AlreadyPresent => write!(f, "already_present"),
            FetchStatus::Stored(count) => write!(f, "stored({})", count),
            FetchStatus::NotFound => write!(f, "not_found"),
        }
    }
}

/// Pulls a person's movies from the catalog into the store
///
/// Implementations must be idempotent for movies already stored.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Fetches for `actor` when given, otherwise for `director`
    async fn fetch_and_store(
        &self,
        actor: Option<String>,
        director: Option<String>,
    ) -> AppResult<FetchStatus>;
}

/// Fetcher backed by a [`MovieCatalog`] and a [`MovieStore`]
pub struct MovieFetcher {
    store: Arc<dyn MovieStore>,
    catalog: Arc<dyn MovieCatalog>,
}

impl MovieFetcher {
    pub fn new(store: Arc<dyn MovieStore>, catalog: Arc<dyn MovieCatalog>) -> Self {
        Self { store, catalog }
    }
}

#[async_trait::async_trait]
impl CatalogFetcher for MovieFetcher {
    async fn fetch_and_store(
        &self,
        actor: Option<String>,
        director: Option<String>,
    ) -> AppResult<FetchStatus> {
        let actor = actor.filter(|name| !name.trim().is_empty());
        let director = director.filter(|name| !name.trim().is_empty());

        let (role, name, criterion) = match (actor, director) {
            (Some(actor), _) => (
                PersonRole::Actor,
                actor.clone(),
                MovieCriterion::Actor(actor),
            ),
            (None, Some(director)) => (
                PersonRole::Director,
                director.clone(),
                MovieCriterion::Director(director),
            ),
            (None, None) => {
                return Err(AppError::InvalidInput(
                    "Provide at least an actor or a director name!".to_string(),
                ))
            }
        };

        if self.store.has_movies_matching(&criterion).await? {
            tracing::info!(criterion = %criterion, "Movies already stored, skipping catalog fetch");
            return Ok(FetchStatus::AlreadyPresent);
        }

        let movies = self.catalog.movies_for_person(role, &name).await?;
        if movies.is_empty() {
            tracing::warn!(name = %name, role = %role, "Catalog returned no movies");
            return Ok(FetchStatus::NotFound);
        }

        let stored = self.store.upsert_movies(&movies).await?;

        tracing::info!(
            name = %name,
            role = %role,
            stored,
            catalog = self.catalog.name(),
            "Stored catalog movies"
        );

        Ok(FetchStatus::Stored(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, MockMovieStore};
    use crate::models::Movie;
    use crate::services::catalog::MockMovieCatalog;
    use mockall::predicate::eq;

    fn movie(id: i64, actor: &str, director: &str) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            overview: String::new(),
            release_year: Some(2001),
            genres: vec!["Drama".to_string()],
            actors: vec![actor.to_string()],
            director: director.to_string(),
            rating: 7.0,
            popularity: 12.0,
        }
    }

    fn catalog_returning(movies: Vec<Movie>) -> MockMovieCatalog {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_movies_for_person()
            .times(1)
            .returning(move |_, _| Ok(movies.clone()));
        catalog.expect_name().return_const("mock");
        catalog
    }

    #[tokio::test]
    async fn test_requires_a_name() {
        let fetcher = MovieFetcher::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockMovieCatalog::new()),
        );
        let err = fetcher
            .fetch_and_store(Some("  ".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_skips_catalog_when_store_has_actor() {
        let store = MemoryStore::new();
        store.upsert_movies(&[movie(1, "Ann", "Dee")]).await.unwrap();

        // No expectations: any catalog call would panic
        let fetcher = MovieFetcher::new(Arc::new(store), Arc::new(MockMovieCatalog::new()));
        let status = fetcher
            .fetch_and_store(Some("Ann".to_string()), None)
            .await
            .unwrap();
        assert_eq!(status, FetchStatus::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_stores_fetched_movies_for_director() {
        let store = Arc::new(MemoryStore::new());
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_movies_for_person()
            .with(eq(PersonRole::Director), eq("Dee"))
            .times(1)
            .returning(|_, _| Ok(vec![movie(1, "Ann", "Dee"), movie(2, "Bob", "Dee")]));
        catalog.expect_name().return_const("mock");

        let fetcher = MovieFetcher::new(store.clone(), Arc::new(catalog));
        let status = fetcher
            .fetch_and_store(None, Some("Dee".to_string()))
            .await
            .unwrap();

        assert_eq!(status, FetchStatus::Stored(2));
        assert_eq!(store.count_movies().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_refetch_does_not_duplicate() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_movies(&[movie(5, "Old", "Dee")]).await.unwrap();

        let fetcher = MovieFetcher::new(
            store.clone(),
            Arc::new(catalog_returning(vec![movie(5, "Ann", "Dee")])),
        );
        let status = fetcher
            .fetch_and_store(Some("Ann".to_string()), None)
            .await
            .unwrap();

        assert_eq!(status, FetchStatus::Stored(1));
        let movies = store.fetch_all_movies().await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].actors, vec!["Ann".to_string()]);
    }

    #[tokio::test]
    async fn test_not_found_leaves_store_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = MovieFetcher::new(store.clone(), Arc::new(catalog_returning(vec![])));

        let status = fetcher
            .fetch_and_store(Some("Nobody".to_string()), None)
            .await
            .unwrap();

        assert_eq!(status, FetchStatus::NotFound);
        assert_eq!(store.count_movies().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_catalog_error_propagates() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_movies_for_person()
            .returning(|_, _| Err(AppError::ExternalApi("TMDB down".to_string())));

        let mut store = MockMovieStore::new();
        store.expect_has_movies_matching().returning(|_| Ok(false));
        store.expect_upsert_movies().never();

        let fetcher = MovieFetcher::new(Arc::new(store), Arc::new(catalog));
        let err = fetcher
            .fetch_and_store(Some("Ann".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            FetchStatus::Stored(3).message("Ann"),
            "Stored 3 movies for Ann successfully!"
        );
        assert_eq!(FetchStatus::NotFound.message("Ann"), "No movies found for Ann");
    }
}
