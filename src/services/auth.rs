// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up, sign-in and email verification flows.

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, OtpType, SignUpRequest};
use crate::config::Config;
use crate::error::Result;
use crate::middleware::gate::DASHBOARD_PATH;
use crate::models::{AuthSession, SignUpOutcome};
use crate::services::countdown::Countdown;
use crate::services::profile::ensure_profile_stub;

pub const CONFIRM_PATH: &str = "/auth/confirm";
pub const CALLBACK_PATH: &str = "/auth/callback";
pub const INVALID_LINK_MESSAGE: &str = "Invalid authentication link";
/// Seconds the confirmation screen waits before moving on.
pub const CONFIRM_COUNTDOWN_SECS: u32 = 5;
/// Where a failed verification offers to go next.
pub const RETRY_LINKS: [&str; 2] = ["/signup", "/login"];

/// Sign-up form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Sign-in form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Create an account and, best effort, its profile stub.
pub async fn sign_up(
    backend: &dyn Backend,
    config: &Config,
    form: &SignUpForm,
) -> Result<SignUpOutcome> {
    let request = SignUpRequest {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        full_name: form.name.trim().to_string(),
        email_redirect_to: format!("{}{}", config.site_url, CALLBACK_PATH),
    };

    let outcome = backend.sign_up(&request).await.map_err(|e| {
        tracing::warn!(error = %e, "Sign-up rejected");
        e
    })?;

    let user = outcome.user();
    tracing::info!(
        user_id = %user.id,
        verification_required = matches!(outcome, SignUpOutcome::VerificationRequired(_)),
        "Account created"
    );

    // The callback reconciles again, so a failure here only delays the row.
    if let Err(e) = ensure_profile_stub(backend, user).await {
        tracing::warn!(user_id = %user.id, error = %e, "Profile stub creation failed");
    }

    Ok(outcome)
}

pub async fn sign_in(backend: &dyn Backend, form: &SignInForm) -> Result<AuthSession> {
    let session = backend
        .sign_in_with_password(form.email.trim(), &form.password)
        .await?;
    tracing::info!(user_id = %session.user.id, "User signed in");
    Ok(session)
}

/// Revoke the session at the backend. Failures are logged only; the
/// caller clears cookies either way.
pub async fn sign_out(backend: &dyn Backend, access_token: Option<&str>) {
    let Some(token) = access_token else {
        return;
    };
    if let Err(e) = backend.sign_out(token).await {
        tracing::warn!(error = %e, "Backend sign-out failed");
    }
}

/// Query parameters of the verification link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub token_hash: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub next: Option<String>,
}

/// Result of processing a verification link.
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    Verified { session: AuthSession, next: String },
    Failed { message: String },
}

impl CallbackOutcome {
    fn failed(message: impl Into<String>) -> Self {
        CallbackOutcome::Failed {
            message: message.into(),
        }
    }

    /// Confirmation screen URL for this outcome.
    pub fn confirm_location(&self) -> String {
        match self {
            CallbackOutcome::Verified { next, .. } => format!(
                "{CONFIRM_PATH}?success=true&next={}",
                urlencoding::encode(next)
            ),
            CallbackOutcome::Failed { message } => {
                format!("{CONFIRM_PATH}?error={}", urlencoding::encode(message))
            }
        }
    }
}

/// Redirect target after verification. Only same-site relative paths are
/// accepted; anything else falls back to the dashboard.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.contains("://") =>
        {
            path.to_string()
        }
        _ => DASHBOARD_PATH.to_string(),
    }
}

/// Process a verification link.
///
/// Provider errors take precedence, then one-time token verification,
/// then code exchange. A verified user gets a profile stub if they have
/// no profile row yet.
pub async fn handle_callback(
    backend: &dyn Backend,
    params: &CallbackParams,
    code_verifier: Option<&str>,
) -> CallbackOutcome {
    if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
        let message = params
            .error_description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(error);
        tracing::warn!(error = %error, description = ?params.error_description, "Auth provider returned an error");
        return CallbackOutcome::failed(message);
    }

    let next = safe_next(params.next.as_deref());

    let result = match (&params.token_hash, &params.kind, &params.code) {
        (Some(token_hash), Some(kind), _) => match kind.parse::<OtpType>() {
            Ok(kind) => backend.verify_otp(token_hash, kind).await,
            Err(e) => Err(e),
        },
        (_, _, Some(code)) => backend.exchange_code_for_session(code, code_verifier).await,
        _ => return CallbackOutcome::failed(INVALID_LINK_MESSAGE),
    };

    let session = match result {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Verification failed");
            return CallbackOutcome::failed(e.user_message());
        }
    };

    if let Err(e) = ensure_profile_stub(backend, &session.user).await {
        tracing::warn!(user_id = %session.user.id, error = %e, "Profile stub creation failed");
    }

    tracing::info!(user_id = %session.user.id, "Email verified");
    CallbackOutcome::Verified { session, next }
}

/// Query parameters of the confirmation screen.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmParams {
    pub success: Option<String>,
    pub error: Option<String>,
    pub next: Option<String>,
}

/// What the confirmation screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ConfirmView {
    Success {
        next: String,
        countdown_secs: u32,
    },
    Failure {
        message: String,
        retry: Vec<&'static str>,
    },
    Pending,
}

pub fn confirm_view(params: &ConfirmParams) -> ConfirmView {
    if params.success.as_deref() == Some("true") {
        let countdown =
            Countdown::new(CONFIRM_COUNTDOWN_SECS, safe_next(params.next.as_deref()));
        return ConfirmView::Success {
            next: countdown.target().to_string(),
            countdown_secs: countdown.remaining(),
        };
    }
    match &params.error {
        Some(message) => ConfirmView::Failure {
            message: message.clone(),
            retry: RETRY_LINKS.to_vec(),
        },
        None => ConfirmView::Pending,
    }
}
