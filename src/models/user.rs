use serde::{Deserialize, Serialize};

/// A registered account as persisted by the user store
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, salt included
    pub password_hash: String,
    pub favorite_genres: Vec<String>,
    pub watchlist: Vec<String>,
}

/// Public view of a user, never carrying credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub favorite_genres: Vec<String>,
    pub watchlist: Vec<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            favorite_genres: user.favorite_genres.clone(),
            watchlist: user.watchlist.clone(),
        }
    }
}

/// Partial profile update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub favorite_genres: Option<Vec<String>>,
    #[serde(default)]
    pub watchlist: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn apply(&self, user: &mut User) {
        if let Some(genres) = &self.favorite_genres {
            user.favorite_genres = genres.clone();
        }
        if let Some(watchlist) = &self.watchlist {
            user.watchlist = watchlist.clone();
        }
    }
}
