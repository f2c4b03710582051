// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use elevateu::backend::MemoryBackend;
use elevateu::config::Config;
use elevateu::middleware::auth::{create_session_token, ACCESS_TOKEN_COOKIE, SESSION_TTL_SECS};
use elevateu::models::{AuthUser, FitnessLevel, Gender, UserProfile};
use elevateu::routes::create_router;
use elevateu::AppState;
use std::sync::Arc;

/// Create a test app backed by the in-memory backend.
/// Returns the router and the backend handle for seeding.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<MemoryBackend>) {
    create_test_app_with_backend(MemoryBackend::new(&Config::test_default().jwt_secret))
}

#[allow(dead_code)]
pub fn create_test_app_with_backend(backend: MemoryBackend) -> (axum::Router, Arc<MemoryBackend>) {
    let config = Config::test_default();
    let backend = Arc::new(backend);
    let state = Arc::new(AppState::new(config, backend.clone()));
    (create_router(state), backend)
}

/// Signed session token for a user, as the auth service would issue.
#[allow(dead_code)]
pub fn session_token(user: &AuthUser) -> String {
    create_session_token(user, &Config::test_default().jwt_secret, SESSION_TTL_SECS)
        .expect("token creation")
}

/// `Cookie` header value carrying a session for `user`.
#[allow(dead_code)]
pub fn session_cookie(user: &AuthUser) -> String {
    format!("{}={}", ACCESS_TOKEN_COOKIE, session_token(user))
}

/// Profile with every completeness field filled in.
#[allow(dead_code)]
pub fn complete_profile(user: &AuthUser) -> UserProfile {
    UserProfile {
        email: user.email.clone(),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
        age: Some(30),
        gender: Some(Gender::Female),
        height_cm: Some(170.0),
        weight_kg: Some(60.0),
        fitness_level: Some(FitnessLevel::Intermediate),
        ..UserProfile::new(user.id)
    }
}

/// GET request with an optional session cookie.
#[allow(dead_code)]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// POST request with a JSON body and an optional session cookie.
#[allow(dead_code)]
pub fn post_json(uri: &str, cookie: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}
