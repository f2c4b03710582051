// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route gate: session check plus the onboarding redirect rules.
//!
//! [`decide`] is a pure function of the path, session validity and the
//! profile row. [`route_gate`] wires it into the router: it verifies the
//! session cookie, loads the profile, and either redirects or passes the
//! request on with the [`Session`] and profile in its extensions.

use crate::error::AppError;
use crate::middleware::auth::{session_from_request, Session};
use crate::models::profile::is_profile_complete;
use crate::models::UserProfile;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/login";
pub const COMPLETE_PROFILE_PATH: &str = "/complete-profile";
pub const SETTINGS_PATH: &str = "/settings";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Paths reachable without a session.
const PUBLIC_PATHS: &[&str] = &["/", "/login", "/signup", "/health"];
const PUBLIC_PREFIXES: &[&str] = &["/images/", "/auth/"];

/// Routes that establish or end a session; they must work whatever the
/// profile state is.
const SESSION_ROUTE_PREFIX: &str = "/auth/";

/// Paths the gate never sees.
const UNGUARDED_PREFIXES: &[&str] = &["/api/", "/_next/static/", "/_next/image", "/static/"];
const UNGUARDED_SUFFIXES: &[&str] = &[".svg", ".png", ".ico", ".jpg", ".css", ".js"];

/// Outcome of the gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin,
    RedirectToProfile,
    RedirectToDashboard,
}

impl GateDecision {
    /// Redirect target, or `None` to let the request through.
    pub fn location(self) -> Option<&'static str> {
        match self {
            GateDecision::Allow => None,
            GateDecision::RedirectToLogin => Some(LOGIN_PATH),
            GateDecision::RedirectToProfile => Some(COMPLETE_PROFILE_PATH),
            GateDecision::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Whether the gate applies to a path at all (static assets, image
/// optimization and the JSON API are excluded).
pub fn is_guarded_path(path: &str) -> bool {
    if path == "/api" || path == "/favicon.ico" {
        return false;
    }
    !(UNGUARDED_PREFIXES.iter().any(|p| path.starts_with(p))
        || UNGUARDED_SUFFIXES.iter().any(|s| path.ends_with(s)))
}

/// Paths allowed whatever the session and profile state, so they never
/// depend on the profile lookup.
pub fn is_always_allowed(path: &str) -> bool {
    path.starts_with(SESSION_ROUTE_PREFIX) || path == "/health"
}

/// Decide what happens to a request.
///
/// A missing profile row counts as an incomplete profile. The settings
/// page stays reachable with an incomplete profile so users can fix it.
pub fn decide(path: &str, has_session: bool, profile: Option<&UserProfile>) -> GateDecision {
    if is_always_allowed(path) {
        return GateDecision::Allow;
    }
    if !has_session {
        return if is_public_path(path) {
            GateDecision::Allow
        } else {
            GateDecision::RedirectToLogin
        };
    }

    let complete = is_profile_complete(profile);

    if !complete && path != COMPLETE_PROFILE_PATH && path != SETTINGS_PATH {
        return GateDecision::RedirectToProfile;
    }
    if complete && path == COMPLETE_PROFILE_PATH {
        return GateDecision::RedirectToDashboard;
    }
    GateDecision::Allow
}

/// Profile row fetched by the gate, handed to page handlers.
#[derive(Debug, Clone)]
pub struct GateProfile(pub Option<UserProfile>);

/// Router middleware applying [`decide`] to every guarded path.
pub async fn route_gate(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();
    if !is_guarded_path(&path) || is_always_allowed(&path) {
        return Ok(next.run(request).await);
    }

    let session = session_from_request(&jar, request.headers(), &state.config.jwt_secret);

    let profile = match &session {
        // A missing row is Ok(None); only real failures abort.
        Some(s) => state.backend.get_profile(s.user_id).await.map_err(|e| {
            tracing::error!(user_id = %s.user_id, error = %e, "Profile lookup failed in gate");
            e
        })?,
        None => None,
    };

    let decision = decide(&path, session.is_some(), profile.as_ref());
    if let Some(location) = decision.location() {
        tracing::debug!(path = %path, ?decision, "Gate redirect");
        return Ok(Redirect::to(location).into_response());
    }

    if let Some(session) = session {
        request.extensions_mut().insert::<Session>(session);
        request.extensions_mut().insert(GateProfile(profile));
    }
    Ok(next.run(request).await)
}
