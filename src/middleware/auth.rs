// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session tokens: cookies, JWT verification and the API auth middleware.
//!
//! The backend issues HS256 access tokens signed with a secret shared
//! with this service, so a session is validated locally instead of with a
//! round-trip to the auth API.

use crate::error::AppError;
use crate::models::{AuthSession, AuthUser, UserMetadata};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const ACCESS_TOKEN_COOKIE: &str = "elevateu_access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "elevateu_refresh_token";
/// PKCE verifier stored by the browser client before an OAuth redirect.
pub const CODE_VERIFIER_COOKIE: &str = "elevateu_code_verifier";

/// Audience claim on user access tokens.
pub const SESSION_AUDIENCE: &str = "authenticated";
/// Access token lifetime for locally issued sessions (1 hour).
pub const SESSION_TTL_SECS: u64 = 60 * 60;
/// Refresh cookie lifetime (30 days).
const REFRESH_COOKIE_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (auth user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Verified session of the current requester.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub expires_at: DateTime<Utc>,
    /// Raw token, needed to sign out at the backend.
    pub access_token: String,
}

/// Create a session JWT for a user.
pub fn create_session_token(
    user: &AuthUser,
    signing_key: &[u8],
    ttl_secs: u64,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user.id.to_string(),
        iat: now,
        exp: now + ttl_secs as usize,
        aud: SESSION_AUDIENCE.to_string(),
        email: user.email.clone(),
        user_metadata: user.user_metadata.clone(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a session token's signature, audience and expiry.
pub fn verify_session_token(token: &str, signing_key: &[u8]) -> Result<Session, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[SESSION_AUDIENCE]);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        AppError::InvalidToken
    })?;

    let claims = token_data.claims;
    let user_id: Uuid = claims.sub.parse().map_err(|_| AppError::InvalidToken)?;
    let expires_at =
        DateTime::from_timestamp(claims.exp as i64, 0).ok_or(AppError::InvalidToken)?;

    Ok(Session {
        user_id,
        email: claims.email,
        full_name: claims.user_metadata.full_name,
        expires_at,
        access_token: token.to_string(),
    })
}

/// Raw session token from the cookie, falling back to a bearer header.
pub fn token_from_request(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Verified session for a request, if any. Invalid or expired tokens
/// count as no session.
pub fn session_from_request(
    jar: &CookieJar,
    headers: &HeaderMap,
    signing_key: &[u8],
) -> Option<Session> {
    let token = token_from_request(jar, headers)?;
    verify_session_token(&token, signing_key).ok()
}

/// Middleware that requires a valid session; responds 401 otherwise.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = token_from_request(&jar, request.headers()).ok_or(AppError::Unauthorized)?;
    let session = verify_session_token(&token, &state.config.jwt_secret)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Add session cookies for a freshly issued session.
pub fn set_session_cookies(jar: CookieJar, session: &AuthSession, secure: bool) -> CookieJar {
    let access_ttl = session.expires_in.unwrap_or(SESSION_TTL_SECS as i64);

    let access = Cookie::build((ACCESS_TOKEN_COOKIE, session.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(access_ttl));

    let jar = jar.add(access);

    match &session.refresh_token {
        Some(refresh) => jar.add(
            Cookie::build((REFRESH_TOKEN_COOKIE, refresh.clone()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(secure)
                .max_age(time::Duration::seconds(REFRESH_COOKIE_TTL_SECS)),
        ),
        None => jar,
    }
}

/// Remove all session cookies.
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(CODE_VERIFIER_COOKIE).path("/"))
}
