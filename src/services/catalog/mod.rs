//! Third-party movie catalog access
//!
//! The engine never talks to the catalog directly; it goes through the
//! fetcher, which only reaches this trait when the store lacks the requested
//! person's movies.
use crate::{
    error::AppResult,
    models::{Movie, PersonRole},
};

pub mod tmdb;

pub use tmdb::TmdbClient;

/// Source of movie metadata keyed by cast or crew member
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Movies credited to the best match for `name` in the given role
    ///
    /// Returns an empty list when the catalog knows no such person.
    async fn movies_for_person(&self, role: PersonRole, name: &str) -> AppResult<Vec<Movie>>;

    /// Catalog name for logging
    fn name(&self) -> &'static str;
}
