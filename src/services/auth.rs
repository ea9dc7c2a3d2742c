use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{Cache, CacheKey, UserStore},
    error::{AppError, AppResult},
    models::{User, UserProfile},
};

/// Maps opaque bearer tokens to usernames
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, token: &str, username: &str, ttl: Duration) -> AppResult<()>;

    /// Username for a live token, `None` when unknown or expired
    async fn resolve(&self, token: &str) -> AppResult<Option<String>>;

    async fn revoke(&self, token: &str) -> AppResult<()>;
}

/// Sessions kept in Redis with a TTL
pub struct RedisSessionStore {
    cache: Cache,
}

impl RedisSessionStore {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, token: &str, username: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .set(&CacheKey::Session(token.to_string()), &username, ttl.as_secs().max(1))
            .await
    }

    async fn resolve(&self, token: &str) -> AppResult<Option<String>> {
        self.cache
            .get_from_cache(&CacheKey::Session(token.to_string()))
            .await
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.cache.delete(&CacheKey::Session(token.to_string())).await
    }
}

/// Process-local sessions, lost on restart
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, token: &str, username: &str, ttl: Duration) -> AppResult<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        sessions.insert(token.to_string(), (username.to_string(), now + ttl));
        Ok(())
    }

    async fn resolve(&self, token: &str) -> AppResult<Option<String>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token) {
            Some((username, expires_at)) if *expires_at > Instant::now() => {
                Ok(Some(username.clone()))
            }
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

/// Argon2id PHC string with a fresh random salt
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Checks a password against a stored PHC string
fn verify_password(password: &str, stored: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| AppError::Internal(format!("Stored password hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Runs the CPU-bound hashing work off the async executor
async fn blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Password task failed: {}", e)))?
}

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required!", field)));
    }
    Ok(())
}

/// Registration, login and token verification
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            session_ttl,
        }
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> AppResult<UserProfile> {
        require("Username", username)?;
        require("Password", password)?;
        require("Email", email)?;

        let owned = password.to_string();
        let password_hash = blocking(move || hash_password(&owned)).await?;
        let user = User {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password_hash,
            favorite_genres: Vec::new(),
            watchlist: Vec::new(),
        };

        self.users.create_user(&user).await?;
        tracing::info!(username = %user.username, "User registered");

        Ok(UserProfile::from(&user))
    }

    /// Verifies credentials and opens a session, returning its token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let invalid = || AppError::Unauthorized("Invalid username or password!".to_string());

        let user = self
            .users
            .find_user(username.trim())
            .await?
            .ok_or_else(invalid)?;

        let owned = password.to_string();
        let stored = user.password_hash.clone();
        if !blocking(move || verify_password(&owned, &stored)).await? {
            tracing::info!(username = %user.username, "Rejected login");
            return Err(invalid());
        }

        let token = Uuid::new_v4().to_string();
        self.sessions
            .create(&token, &user.username, self.session_ttl)
            .await?;

        tracing::info!(username = %user.username, "User logged in");
        Ok(token)
    }

    /// Username behind a bearer token
    pub async fn authenticate(&self, token: &str) -> AppResult<String> {
        self.sessions
            .resolve(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token!".to_string()))
    }

    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.sessions.revoke(token).await
    }
}
