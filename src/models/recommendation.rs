use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Movie, MovieCriterion};

/// Free-text recommendation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MovieQuery {
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl MovieQuery {
    pub fn actor(&self) -> Option<&str> {
        non_blank(&self.actor)
    }

    pub fn director(&self) -> Option<&str> {
        non_blank(&self.director)
    }

    /// Genre labels with blank entries dropped
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.genres
            .iter()
            .map(|genre| genre.trim())
            .filter(|genre| !genre.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.actor().is_none() && self.director().is_none() && self.genres().next().is_none()
    }

    /// Actor, then genres, then director, whitespace-joined
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.actor());
        parts.extend(self.genres());
        parts.extend(self.director());
        parts.join(" ")
    }

    /// Actor then director predicates, the terms the catalog can be searched by
    pub fn fetch_criteria(&self) -> Vec<MovieCriterion> {
        let actors = self.actor().map(|name| MovieCriterion::Actor(name.to_string()));
        let directors = self
            .director()
            .map(|name| MovieCriterion::Director(name.to_string()));
        actors.into_iter().chain(directors).collect()
    }
}

/// A ranked movie as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedMovie {
    pub title: String,
    pub actors: Vec<String>,
    pub director: String,
    pub genres: Vec<String>,
    pub rating: f64,
    pub popularity: f64,
    pub match_score: f64,
}

impl RecommendedMovie {
    pub fn from_movie(movie: &Movie, match_score: f64) -> Self {
        Self {
            title: movie.title.clone(),
            actors: movie.actors.clone(),
            director: movie.director.clone(),
            genres: movie.genres.clone(),
            rating: movie.rating,
            popularity: movie.popularity,
            match_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendedMovie>,
}

/// One entry of a user's append-only recommendation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRecord {
    pub username: String,
    pub query: MovieQuery,
    pub results: Vec<RecommendedMovie>,
    pub created_at: DateTime<Utc>,
}

impl RecommendationRecord {
    pub fn new(username: &str, query: MovieQuery, results: Vec<RecommendedMovie>) -> Self {
        Self {
            username: username.to_string(),
            query,
            results,
            created_at: Utc::now(),
        }
    }
}
