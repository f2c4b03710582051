// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity and token types returned by the backend auth service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to the auth user at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Auth user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Tokens issued at sign-in or verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

/// Result of a sign-up call.
///
/// With email confirmation enabled the backend returns only the user; the
/// session arrives later through the verification callback.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    VerificationRequired(AuthUser),
    SignedIn(AuthSession),
}

impl SignUpOutcome {
    pub fn user(&self) -> &AuthUser {
        match self {
            SignUpOutcome::VerificationRequired(user) => user,
            SignUpOutcome::SignedIn(session) => &session.user,
        }
    }
}
