use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{ProfileUpdate, UserProfile},
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Registers a new user
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let profile = state
        .auth
        .register(&request.username, &request.password, &request.email)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully!", "user": profile })),
    ))
}

/// Exchanges credentials for a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password are required!".to_string(),
        ));
    }

    let token = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(json!({ "message": "Login successful", "token": token })))
}

/// Revokes the caller's session token
pub async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(username): AuthUser,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        state.auth.logout(token.trim()).await?;
    }

    tracing::info!(username = %username, "User logged out");
    Ok(Json(json!({ "message": "Logged out" })))
}

/// Returns the caller's profile without credentials
pub async fn profile(
    State(state): State<Arc<AppState>>,
    AuthUser(username): AuthUser,
) -> AppResult<Json<UserProfile>> {
    let user = state
        .users
        .find_user(&username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found!".to_string()))?;

    Ok(Json(UserProfile::from(&user)))
}

/// Updates favorite genres and/or watchlist
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(username): AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<Value>> {
    let user = state
        .users
        .update_preferences(&username, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found!".to_string()))?;

    Ok(Json(json!({
        "message": "Profile updated successfully!",
        "profile": UserProfile::from(&user),
    })))
}
