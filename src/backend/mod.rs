// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hosted auth + data backend.
//!
//! The service keeps no durable state of its own; everything goes through
//! a [`Backend`]. Handlers receive it through `AppState`, so tests swap in
//! [`MemoryBackend`] instead of talking to the hosted service.

pub mod memory;
pub mod supabase;

pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    AuthSession, ProgressEntry, SignUpOutcome, UserProfile, WorkoutProgram, WorkoutSession,
};

/// Table names as constants.
pub mod tables {
    pub const USER_PROFILES: &str = "user_profiles";
    pub const WORKOUT_SESSIONS: &str = "workout_sessions";
    pub const WORKOUT_PROGRAMS: &str = "workout_programs";
    pub const PROGRESS_ENTRIES: &str = "progress_entries";
}

/// Kind of one-time verification token carried by email links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpType {
    Signup,
    Recovery,
    Invite,
    Email,
    MagicLink,
}

impl FromStr for OtpType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(OtpType::Signup),
            "recovery" => Ok(OtpType::Recovery),
            "invite" => Ok(OtpType::Invite),
            "email" => Ok(OtpType::Email),
            "magiclink" => Ok(OtpType::MagicLink),
            other => Err(AppError::BadRequest(format!(
                "Unsupported verification type: {other}"
            ))),
        }
    }
}

/// Sign-up form data passed to the auth service.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Where the verification email should send the user.
    pub email_redirect_to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Date restriction on `workout_sessions.date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    OnOrAfter(NaiveDate),
    Before(NaiveDate),
}

impl DateFilter {
    pub fn matches(&self, day: NaiveDate) -> bool {
        match self {
            DateFilter::OnOrAfter(bound) => day >= *bound,
            DateFilter::Before(bound) => day < *bound,
        }
    }
}

/// How much of each session row to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDetail {
    /// `id, date` only (streaks and counts).
    Dates,
    /// With program name and day.
    Plan,
    /// With program, day and performed exercises.
    Exercises,
}

/// Query over one profile's workout sessions.
#[derive(Debug, Clone)]
pub struct SessionQuery {
    pub profile_id: Uuid,
    pub date_filter: Option<DateFilter>,
    pub order: SortOrder,
    pub limit: Option<u32>,
    pub detail: SessionDetail,
}

impl SessionQuery {
    /// All sessions for a profile, newest first, dates only.
    pub fn dates(profile_id: Uuid) -> Self {
        Self {
            profile_id,
            date_filter: None,
            order: SortOrder::Descending,
            limit: None,
            detail: SessionDetail::Dates,
        }
    }
}

/// Query over workout programs. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct ProgramQuery {
    /// Only programs created by this profile.
    pub creator_id: Option<Uuid>,
    /// Only programs flagged public.
    pub public_only: bool,
}

/// Operations the service consumes from the hosted backend.
#[async_trait]
pub trait Backend: Send + Sync {
    // ─── Auth ────────────────────────────────────────────────────

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AppError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;

    /// Verify a one-time token from an email link.
    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> Result<AuthSession, AppError>;

    /// Exchange an authorization code (PKCE) for a session.
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<AuthSession, AppError>;

    // ─── Profiles ────────────────────────────────────────────────

    /// Profile row for an auth user; `Ok(None)` when no row exists.
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError>;

    /// Insert unless a row for the user already exists.
    ///
    /// Returns `true` if a row was created.
    async fn insert_profile_if_absent(&self, profile: &UserProfile) -> Result<bool, AppError>;

    /// Insert or overwrite the row keyed by `user_id`.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile, AppError>;

    // ─── Workouts ────────────────────────────────────────────────

    async fn list_workout_sessions(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<WorkoutSession>, AppError>;

    async fn list_workout_programs(
        &self,
        query: &ProgramQuery,
    ) -> Result<Vec<WorkoutProgram>, AppError>;

    /// Progress entries for a profile, newest first.
    async fn list_progress_entries(
        &self,
        profile_id: Uuid,
        limit: u32,
    ) -> Result<Vec<ProgressEntry>, AppError>;
}
