// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page view models. All of these sit behind the route gate, which has
//! already verified the session and loaded the profile row.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::Session;
use crate::middleware::gate::GateProfile;
use crate::services::dashboard::{load_dashboard, DashboardView};
use crate::services::onboarding::{FormMode, WizardView};
use crate::services::profile::wizard_for;
use crate::services::workouts::{
    self, AllWorkoutsView, CompletedWorkoutsView, CurrentWorkoutsView, ProgramListQuery,
    TemplateQuery, WorkoutTemplate,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/dashboard", get(dashboard))
        .route("/complete-profile", get(complete_profile))
        .route("/settings", get(settings))
        .route("/current-workouts", get(current_workouts))
        .route("/completed-workouts", get(completed_workouts))
        .route("/all-workouts", get(all_workouts))
        .route("/templates", get(templates))
}

// ─── Public pages ────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingView {
    pub name: &'static str,
    pub tagline: &'static str,
    pub signed_in: bool,
    pub primary_action: &'static str,
}

async fn landing(session: Option<Extension<Session>>) -> Json<LandingView> {
    let signed_in = session.is_some();
    Json(LandingView {
        name: "ElevateU",
        tagline: "Personalized workout plans that grow with you",
        signed_in,
        primary_action: if signed_in { "/dashboard" } else { "/signup" },
    })
}

/// Messages passed to the auth pages through the query string.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthPageParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct AuthPageView {
    pub page: &'static str,
    pub action: &'static str,
    #[serde(flatten)]
    pub params: AuthPageParams,
}

async fn login_page(Query(params): Query<AuthPageParams>) -> Json<AuthPageView> {
    Json(AuthPageView {
        page: "login",
        action: "/auth/login",
        params,
    })
}

async fn signup_page(Query(params): Query<AuthPageParams>) -> Json<AuthPageView> {
    Json(AuthPageView {
        page: "signup",
        action: "/auth/signup",
        params,
    })
}

// ─── Signed-in pages ─────────────────────────────────────────

fn profile_row_id(profile: &GateProfile) -> Option<uuid::Uuid> {
    profile.0.as_ref().and_then(|p| p.id)
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Extension(GateProfile(profile)): Extension<GateProfile>,
) -> Result<Json<DashboardView>> {
    // The gate only lets complete profiles through to here.
    let profile = profile
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {}", session.user_id)))?;
    let view = load_dashboard(state.backend.clone(), profile, Utc::now()).await?;
    Ok(Json(view))
}

async fn complete_profile(
    Extension(session): Extension<Session>,
    Extension(profile): Extension<GateProfile>,
) -> Json<WizardView> {
    Json(wizard_for(profile.0.as_ref(), &session, FormMode::Complete).view())
}

async fn settings(
    Extension(session): Extension<Session>,
    Extension(profile): Extension<GateProfile>,
) -> Json<WizardView> {
    Json(wizard_for(profile.0.as_ref(), &session, FormMode::Update).view())
}

async fn current_workouts(
    State(state): State<Arc<AppState>>,
    Extension(profile): Extension<GateProfile>,
) -> Result<Json<CurrentWorkoutsView>> {
    let view = workouts::current_workouts(
        state.backend.as_ref(),
        profile_row_id(&profile),
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(view))
}

async fn completed_workouts(
    State(state): State<Arc<AppState>>,
    Extension(profile): Extension<GateProfile>,
) -> Result<Json<CompletedWorkoutsView>> {
    let view =
        workouts::completed_workouts(state.backend.as_ref(), profile_row_id(&profile), Utc::now())
            .await?;
    Ok(Json(view))
}

async fn all_workouts(
    State(state): State<Arc<AppState>>,
    Extension(profile): Extension<GateProfile>,
    Query(params): Query<ProgramListQuery>,
) -> Result<Json<AllWorkoutsView>> {
    let view =
        workouts::all_workouts(state.backend.as_ref(), profile_row_id(&profile), &params).await?;
    Ok(Json(view))
}

#[derive(Serialize)]
pub struct TemplatesView {
    pub templates: Vec<WorkoutTemplate>,
}

async fn templates(Query(params): Query<TemplateQuery>) -> Json<TemplatesView> {
    Json(TemplatesView {
        templates: workouts::find_templates(&params),
    })
}
