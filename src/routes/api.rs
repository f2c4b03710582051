// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API for signed-in clients: account info and the onboarding form.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::Session;
use crate::models::profile::COMPLETENESS_FIELDS;
use crate::models::{Bmi, ProfileField, UserProfile};
use crate::services::onboarding::{WizardState, WizardView};
use crate::services::profile::{self, SubmitOutcome};
use crate::AppState;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/onboarding/next", post(onboarding_next))
        .route("/api/onboarding/back", post(onboarding_back))
        .route("/api/onboarding/submit", post(onboarding_submit))
        .route("/api/bmi", get(get_bmi))
}

// ─── Account ─────────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub profile: Option<UserProfile>,
    pub profile_complete: bool,
    pub missing_fields: Vec<ProfileField>,
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<MeResponse>> {
    let profile = state.backend.get_profile(session.user_id).await?;
    let missing_fields = match &profile {
        Some(p) => p.missing_fields(),
        None => COMPLETENESS_FIELDS.to_vec(),
    };

    Ok(Json(MeResponse {
        user_id: session.user_id,
        email: session.email,
        profile_complete: missing_fields.is_empty(),
        missing_fields,
        profile,
    }))
}

// ─── Onboarding form ─────────────────────────────────────────

/// The email field mirrors the account and cannot be edited.
fn pin_email(state: &mut WizardState, session: &Session) {
    if let Some(email) = &session.email {
        state.draft.email = Some(email.clone());
    }
}

async fn onboarding_next(
    Extension(session): Extension<Session>,
    Json(mut state): Json<WizardState>,
) -> Json<WizardView> {
    pin_email(&mut state, &session);
    let from = state.step;
    let advanced = state.next();
    tracing::debug!(user_id = %session.user_id, ?from, advanced, "Wizard next");
    Json(state.view())
}

async fn onboarding_back(
    Extension(session): Extension<Session>,
    Json(mut state): Json<WizardState>,
) -> Json<WizardView> {
    pin_email(&mut state, &session);
    state.back();
    Json(state.view())
}

async fn onboarding_submit(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(wizard): Json<WizardState>,
) -> Result<(StatusCode, Json<SubmitOutcome>)> {
    let outcome = profile::submit(state.backend.as_ref(), &session, wizard).await?;
    let status = if outcome.accepted {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(outcome)))
}

// ─── BMI ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiParams {
    pub height_cm: f64,
    pub weight_kg: f64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BmiResponse {
    pub bmi: Bmi,
}

async fn get_bmi(Query(params): Query<BmiParams>) -> Result<Json<BmiResponse>> {
    let bmi = Bmi::from_metrics(params.height_cm, params.weight_kg).ok_or_else(|| {
        AppError::BadRequest("Height and weight must be positive numbers".to_string())
    })?;
    Ok(Json(BmiResponse { bmi }))
}
