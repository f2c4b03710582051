// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up, sign-in, sign-out and email verification routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    clear_session_cookies, set_session_cookies, token_from_request, CODE_VERIFIER_COOKIE,
};
use crate::middleware::gate::DASHBOARD_PATH;
use crate::models::SignUpOutcome;
use crate::services::auth::{
    self as auth_service, CallbackParams, ConfirmParams, ConfirmView, SignInForm, SignUpForm,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/login", post(sign_in))
        .route("/auth/logout", post(sign_out))
        .route("/auth/callback", get(callback))
        .route("/auth/confirm", get(confirm))
}

/// Result of a sign-up or sign-in action.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AuthActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// The account exists but the email link must be followed first.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub verification_required: bool,
}

impl AuthActionResponse {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            redirect: None,
            verification_required: false,
        }
    }
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<SignUpForm>,
) -> Response {
    match auth_service::sign_up(state.backend.as_ref(), &state.config, &form).await {
        Ok(SignUpOutcome::VerificationRequired(_)) => Json(AuthActionResponse {
            success: true,
            error: None,
            redirect: None,
            verification_required: true,
        })
        .into_response(),
        Ok(SignUpOutcome::SignedIn(session)) => {
            let jar = set_session_cookies(jar, &session, state.config.secure_cookies());
            (
                jar,
                Json(AuthActionResponse {
                    success: true,
                    error: None,
                    redirect: Some(DASHBOARD_PATH.to_string()),
                    verification_required: false,
                }),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(AuthActionResponse::failure(e.user_message())),
        )
            .into_response(),
    }
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<SignInForm>,
) -> Result<Response> {
    match auth_service::sign_in(state.backend.as_ref(), &form).await {
        Ok(session) => {
            let jar = set_session_cookies(jar, &session, state.config.secure_cookies());
            Ok((
                jar,
                Json(AuthActionResponse {
                    success: true,
                    error: None,
                    redirect: Some(DASHBOARD_PATH.to_string()),
                    verification_required: false,
                }),
            )
                .into_response())
        }
        Err(e @ AppError::Auth(_)) => {
            tracing::info!(error = %e, "Sign-in rejected");
            Ok((
                StatusCode::UNAUTHORIZED,
                Json(AuthActionResponse::failure(e.user_message())),
            )
                .into_response())
        }
        Err(e) => Err(e),
    }
}

async fn sign_out(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: axum::http::HeaderMap,
) -> (CookieJar, Redirect) {
    let token = token_from_request(&jar, &headers);
    auth_service::sign_out(state.backend.as_ref(), token.as_deref()).await;
    (clear_session_cookies(jar), Redirect::to("/"))
}

async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let verifier = jar.get(CODE_VERIFIER_COOKIE).map(|c| c.value().to_string());
    let outcome =
        auth_service::handle_callback(state.backend.as_ref(), &params, verifier.as_deref()).await;
    let location = outcome.confirm_location();

    let jar = match outcome {
        auth_service::CallbackOutcome::Verified { session, .. } => {
            set_session_cookies(jar, &session, state.config.secure_cookies())
        }
        auth_service::CallbackOutcome::Failed { .. } => jar,
    };
    (jar, Redirect::to(&location))
}

async fn confirm(Query(params): Query<ConfirmParams>) -> Json<ConfirmView> {
    Json(auth_service::confirm_view(&params))
}
