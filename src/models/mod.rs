use serde::{Deserialize, Serialize};

mod movie;
mod recommendation;
mod user;

pub use movie::{Movie, MovieCriterion, PersonRole, UNKNOWN_DIRECTOR};
pub use recommendation::{
    MovieQuery, RecommendationRecord, RecommendationResponse, RecommendedMovie,
};
pub use user::{ProfileUpdate, User, UserProfile};

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response of GET /genre/movie/list
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbGenre {
    pub id: u64,
    pub name: String,
}

/// Response of GET /search/person
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPersonSearch {
    #[serde(default)]
    pub results: Vec<TmdbPerson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPerson {
    pub id: u64,
}

/// Response of GET /discover/movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDiscoverPage {
    #[serde(default)]
    pub results: Vec<TmdbMovieSummary>,
}

/// Movie entry from a discover listing
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

impl TmdbMovieSummary {
    /// Year prefix of `release_date`, when the catalog provides one
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

/// Response of GET /movie/{id}?append_to_response=credits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub credits: TmdbCredits,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbCastMember {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}
