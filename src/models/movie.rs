use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Director name stored when the catalog credits list no director
pub const UNKNOWN_DIRECTOR: &str = "Unknown";

/// A movie in the corpus, keyed by its catalog identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Movie {
    /// Catalog identifier, stable across fetches
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Top-billed cast, in billing order
    #[serde(default)]
    pub actors: Vec<String>,
    pub director: String,
    pub rating: f64,
    pub popularity: f64,
}

impl Movie {
    /// Concatenation of every text field the similarity index is built over
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3 + self.genres.len() + self.actors.len());
        parts.push(&self.title);
        parts.push(&self.overview);
        parts.extend(self.genres.iter().map(String::as_str));
        parts.extend(self.actors.iter().map(String::as_str));
        parts.push(&self.director);

        parts
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn has_actor(&self, name: &str) -> bool {
        self.actors.iter().any(|actor| actor == name)
    }

    pub fn has_genre(&self, name: &str) -> bool {
        self.genres.iter().any(|genre| genre == name)
    }
}

/// Role a person played on a movie, as understood by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonRole {
    Actor,
    Director,
}

impl Display for PersonRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersonRole::Actor => write!(f, "actor"),
            PersonRole::Director => write!(f, "director"),
        }
    }
}

/// Predicate used to check whether the store already covers a query term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieCriterion {
    Actor(String),
    Director(String),
    Genre(String),
}

impl MovieCriterion {
    pub fn matches(&self, movie: &Movie) -> bool {
        match self {
            MovieCriterion::Actor(name) => movie.has_actor(name),
            MovieCriterion::Director(name) => movie.director == *name,
            MovieCriterion::Genre(name) => movie.has_genre(name),
        }
    }
}

impl Display for MovieCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieCriterion::Actor(name) => write!(f, "actor:{}", name),
            MovieCriterion::Director(name) => write!(f, "director:{}", name),
            MovieCriterion::Genre(name) => write!(f, "genre:{}", name),
        }
    }
}
