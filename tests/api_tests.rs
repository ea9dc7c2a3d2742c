use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use cinerank_api::{
    db::{MemoryStore, MovieStore},
    error::AppResult,
    models::Movie,
    routes::{create_router, AppState},
    services::{AuthService, CatalogFetcher, FetchStatus, MemorySessionStore},
};

/// Catalog stand-in serving canned movies per actor
struct CannedFetcher {
    store: MemoryStore,
    by_actor: HashMap<String, Vec<Movie>>,
}

#[async_trait::async_trait]
impl CatalogFetcher for CannedFetcher {
    async fn fetch_and_store(
        &self,
        actor: Option<String>,
        director: Option<String>,
    ) -> AppResult<FetchStatus> {
        let name = actor.or(director).unwrap_or_default();
        match self.by_actor.get(&name) {
            Some(movies) => Ok(FetchStatus::Stored(self.store.upsert_movies(movies).await?)),
            None => Ok(FetchStatus::NotFound),
        }
    }
}

fn movie(id: i64, title: &str, genres: &[&str], actors: &[&str], rating: f64) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        overview: String::new(),
        release_year: Some(2000),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        actors: actors.iter().map(|a| a.to_string()).collect(),
        director: "Dee".to_string(),
        rating,
        popularity: 10.0,
    }
}

async fn create_test_server(seed: Vec<Movie>) -> (TestServer, MemoryStore) {
    let store = MemoryStore::new();
    store.upsert_movies(&seed).await.unwrap();

    let fetcher = CannedFetcher {
        store: store.clone(),
        by_actor: HashMap::from([(
            "Keanu Reeves".to_string(),
            vec![movie(10, "Speed", &["Action"], &["Keanu Reeves"], 7.3)],
        )]),
    };
    let auth = AuthService::new(
        Arc::new(store.clone()),
        Arc::new(MemorySessionStore::new()),
        Duration::from_secs(3600),
    );
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(fetcher),
        auth,
    );

    (TestServer::new(create_router(Arc::new(state))).unwrap(), store)
}

async fn login(server: &TestServer, username: &str) -> HeaderValue {
    server
        .post("/register")
        .json(&json!({ "username": username, "password": "pw", "email": "x@example.com" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/login")
        .json(&json!({ "username": username, "password": "pw" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let token = body["token"].as_str().unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server(vec![]).await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_check_db() {
    let (server, _) = create_test_server(vec![]).await;
    server.get("/check_db").await.assert_status_ok();
}

#[tokio::test]
async fn test_register_validation_and_conflict() {
    let (server, _) = create_test_server(vec![]).await;

    server
        .post("/register")
        .json(&json!({ "username": "ada", "password": "pw" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    login(&server, "ada").await;

    server
        .post("/register")
        .json(&json!({ "username": "ada", "password": "pw", "email": "x@example.com" }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let (server, _) = create_test_server(vec![]).await;
    login(&server, "ada").await;

    server
        .post("/login")
        .json(&json!({ "username": "ada", "password": "nope" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (server, _) = create_test_server(vec![]).await;

    server
        .post("/recommend")
        .json(&json!({ "genres": ["Action"] }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/history")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer bogus"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_profile_and_update() {
    let (server, _) = create_test_server(vec![]).await;
    let auth = login(&server, "ada").await;

    let response = server
        .post("/update_profile")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "favorite_genres": ["Horror"] }))
        .await;
    response.assert_status_ok();

    let response = server
        .get("/profile")
        .add_header(header::AUTHORIZATION, auth)
        .await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["username"], "ada");
    assert_eq!(profile["favorite_genres"], json!(["Horror"]));
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn test_recommend_single_movie_corpus() {
    let (server, _) = create_test_server(vec![movie(1, "Alpha", &["Action"], &["A"], 7.0)]).await;
    let auth = login(&server, "ada").await;

    let response = server
        .post("/recommend")
        .add_header(header::AUTHORIZATION, auth)
        .json(&json!({ "genres": ["Action"] }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["title"], "Alpha");
    assert!(recommendations[0]["match_score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_recommend_empty_query_is_bad_request() {
    let (server, _) = create_test_server(vec![movie(1, "Alpha", &["Action"], &["A"], 7.0)]).await;
    let auth = login(&server, "ada").await;

    server
        .post("/recommend")
        .add_header(header::AUTHORIZATION, auth)
        .json(&json!({ "actor": "", "director": "", "genres": [] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_empty_corpus_is_unavailable() {
    let (server, _) = create_test_server(vec![]).await;
    let auth = login(&server, "ada").await;

    server
        .post("/recommend")
        .add_header(header::AUTHORIZATION, auth)
        .json(&json!({ "genres": ["Drama"] }))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_recommend_fetches_unknown_actor() {
    let (server, store) =
        create_test_server(vec![movie(1, "Heat", &["Crime"], &["Al Pacino"], 8.0)]).await;
    let auth = login(&server, "ada").await;

    let response = server
        .post("/recommend")
        .add_header(header::AUTHORIZATION, auth)
        .json(&json!({ "actor": "Keanu Reeves" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["recommendations"][0]["title"], "Speed");
    assert_eq!(store.count_movies().await.unwrap(), 2);
}

#[tokio::test]
async fn test_recommend_actor_without_movies() {
    let (server, store) =
        create_test_server(vec![movie(1, "Heat", &["Crime"], &["Al Pacino"], 8.0)]).await;
    let auth = login(&server, "ada").await;

    let response = server
        .post("/recommend")
        .add_header(header::AUTHORIZATION, auth)
        .json(&json!({ "actor": "X" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "No movies found for X");
    assert_eq!(store.count_movies().await.unwrap(), 1);
}

#[tokio::test]
async fn test_history_tracks_each_recommendation() {
    let (server, _) = create_test_server(vec![
        movie(1, "Alpha", &["Action"], &["A"], 7.0),
        movie(2, "Beta", &["Comedy"], &["B"], 6.0),
    ])
    .await;
    let auth = login(&server, "ada").await;
    let other = login(&server, "bob").await;

    for genre in ["Action", "Comedy"] {
        server
            .post("/recommend")
            .add_header(header::AUTHORIZATION, auth.clone())
            .json(&json!({ "genres": [genre] }))
            .await
            .assert_status_ok();
    }

    let response = server
        .get("/history")
        .add_header(header::AUTHORIZATION, auth)
        .await;
    response.assert_status_ok();
    let history: Vec<Value> = response.json();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["query"]["genres"], json!(["Comedy"]));
    assert_eq!(history[1]["query"]["genres"], json!(["Action"]));
    assert_eq!(history[0]["username"], "ada");

    let response = server
        .get("/history")
        .add_header(header::AUTHORIZATION, other)
        .await;
    let history: Vec<Value> = response.json();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_fetch_movies_endpoint() {
    let (server, store) = create_test_server(vec![]).await;
    let auth = login(&server, "ada").await;

    server
        .post("/fetch_movies")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "actor": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/fetch_movies")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({ "actor": "Keanu Reeves" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["stored"], 1);
    assert_eq!(store.count_movies().await.unwrap(), 1);

    server
        .post("/fetch_movies")
        .add_header(header::AUTHORIZATION, auth)
        .json(&json!({ "actor": "Nobody Known" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let (server, _) = create_test_server(vec![]).await;
    let auth = login(&server, "ada").await;

    server
        .post("/logout")
        .add_header(header::AUTHORIZATION, auth.clone())
        .await
        .assert_status_ok();

    server
        .get("/profile")
        .add_header(header::AUTHORIZATION, auth)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
