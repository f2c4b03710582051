// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile persistence on top of the backend.

use chrono::Utc;
use serde::Serialize;

use crate::backend::Backend;
use crate::error::{AppError, Result};
use crate::middleware::auth::Session;
use crate::middleware::gate::DASHBOARD_PATH;
use crate::models::{AuthUser, UserProfile};
use crate::services::onboarding::{
    FormMode, ProfileDraft, ProfileSubmission, SubmitError, WizardState,
};

pub const PROFILE_COMPLETED_MESSAGE: &str = "Profile completed! Let's start your fitness journey!";
pub const PROFILE_UPDATED_MESSAGE: &str = "Profile updated successfully";

/// Result of a submit request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub state: WizardState,
    pub message: String,
    /// Set when the client should navigate away.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip)]
    pub accepted: bool,
}

/// Fresh form for a signed-in user, prefilled from their stored profile.
pub fn wizard_for(profile: Option<&UserProfile>, session: &Session, mode: FormMode) -> WizardState {
    let draft = ProfileDraft::prefill(profile, session.email.as_deref());
    WizardState::new(mode, draft)
}

/// Validate a form and store it.
///
/// Validation failures come back as a non-accepted outcome carrying the
/// updated state; backend failures are errors. The stored row keeps its
/// id and creation time.
pub async fn submit(
    backend: &dyn Backend,
    session: &Session,
    mut state: WizardState,
) -> Result<SubmitOutcome> {
    // The email field is read-only; the account's address always wins.
    if let Some(email) = &session.email {
        state.draft.email = Some(email.clone());
    }

    let submission = match state.begin_submit() {
        Ok(s) => s,
        Err(SubmitError::InProgress) => {
            return Err(AppError::Conflict(SubmitError::InProgress.to_string()));
        }
        Err(e) => {
            tracing::debug!(user_id = %session.user_id, error = %e, "Profile form rejected");
            return Ok(SubmitOutcome {
                state,
                message: e.to_string(),
                redirect: None,
                accepted: false,
            });
        }
    };

    let result = store(backend, session, submission).await;
    state.finish_submit();
    let saved = result?;

    tracing::info!(
        user_id = %session.user_id,
        complete = saved.is_complete(),
        mode = ?state.mode,
        "Profile saved"
    );

    let (message, redirect) = match state.mode {
        FormMode::Complete => (PROFILE_COMPLETED_MESSAGE, Some(DASHBOARD_PATH.to_string())),
        FormMode::Update => (PROFILE_UPDATED_MESSAGE, None),
    };

    Ok(SubmitOutcome {
        state,
        message: message.to_string(),
        redirect,
        accepted: true,
    })
}

async fn store(
    backend: &dyn Backend,
    session: &Session,
    submission: ProfileSubmission,
) -> Result<UserProfile> {
    let existing = backend.get_profile(session.user_id).await?;
    let now = Utc::now();

    let mut row = submission.apply_to(
        existing
            .clone()
            .unwrap_or_else(|| UserProfile::new(session.user_id)),
    );
    row.user_id = session.user_id;
    row.created_at = existing.and_then(|p| p.created_at).or(Some(now));
    row.updated_at = Some(now);

    backend.upsert_profile(&row).await
}

/// Make sure a profile row exists for a freshly verified user.
///
/// Inserts a stub built from the sign-up metadata unless a row already
/// exists. Returns whether a row was created.
pub async fn ensure_profile_stub(backend: &dyn Backend, user: &AuthUser) -> Result<bool> {
    let stub = UserProfile::stub(
        user.id,
        user.email.as_deref(),
        user.user_metadata.full_name.as_deref(),
    );
    let created = backend.insert_profile_if_absent(&stub).await?;
    if created {
        tracing::info!(user_id = %user.id, "Created profile stub");
    }
    Ok(created)
}
