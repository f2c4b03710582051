// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process backend for local development and tests.
//!
//! Mirrors the hosted service's observable behavior closely enough for
//! the route gate, onboarding and auth flows: accounts with email
//! confirmation, one-time verification tokens, authorization codes,
//! profiles keyed by user id, and read-only workout tables. Session
//! tokens are real JWTs signed with the configured secret, so the session
//! middleware verifies them exactly as it does tokens from the hosted
//! service.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::{Backend, OtpType, ProgramQuery, SessionQuery, SignUpRequest, SortOrder};
use crate::error::AppError;
use crate::middleware::auth::{create_session_token, SESSION_TTL_SECS};
use crate::models::{
    AuthSession, AuthUser, ProgressEntry, SignUpOutcome, UserMetadata, UserProfile,
    WorkoutProgram, WorkoutSession,
};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
    confirmed: bool,
}

/// In-memory backend.
pub struct MemoryBackend {
    jwt_secret: Vec<u8>,
    require_email_confirmation: bool,
    /// Accounts keyed by lowercase email.
    accounts: DashMap<String, Account>,
    /// One-time verification tokens → user id.
    otp_tokens: DashMap<String, Uuid>,
    /// Authorization codes → user id.
    auth_codes: DashMap<String, Uuid>,
    /// Profiles keyed by auth user id.
    profiles: DashMap<Uuid, UserProfile>,
    /// Sessions keyed by profile row id.
    workout_sessions: DashMap<Uuid, Vec<WorkoutSession>>,
    programs: DashMap<String, WorkoutProgram>,
    /// Progress entries keyed by profile row id.
    progress: DashMap<Uuid, Vec<ProgressEntry>>,
    fail_profile_reads: AtomicBool,
    fail_profile_writes: AtomicBool,
}

impl MemoryBackend {
    /// New backend whose sign-ups require email verification.
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            jwt_secret: jwt_secret.to_vec(),
            require_email_confirmation: true,
            accounts: DashMap::new(),
            otp_tokens: DashMap::new(),
            auth_codes: DashMap::new(),
            profiles: DashMap::new(),
            workout_sessions: DashMap::new(),
            programs: DashMap::new(),
            progress: DashMap::new(),
            fail_profile_reads: AtomicBool::new(false),
            fail_profile_writes: AtomicBool::new(false),
        }
    }

    /// Sign-ups return a session immediately instead of requiring
    /// verification.
    pub fn with_autoconfirm(mut self) -> Self {
        self.require_email_confirmation = false;
        self
    }

    fn issue_session(&self, user: &AuthUser) -> Result<AuthSession, AppError> {
        let access_token = create_session_token(user, &self.jwt_secret, SESSION_TTL_SECS)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
        Ok(AuthSession {
            access_token,
            refresh_token: Some(Uuid::new_v4().simple().to_string()),
            expires_in: Some(SESSION_TTL_SECS as i64),
            user: user.clone(),
        })
    }

    fn account_by_id(&self, user_id: Uuid) -> Option<Account> {
        self.accounts
            .iter()
            .find(|entry| entry.value().user.id == user_id)
            .map(|entry| entry.value().clone())
    }

    fn confirm(&self, user_id: Uuid) -> Option<AuthUser> {
        self.accounts
            .iter_mut()
            .find(|entry| entry.value().user.id == user_id)
            .map(|mut entry| {
                entry.value_mut().confirmed = true;
                entry.value().user.clone()
            })
    }

    // ─── Test/dev helpers ────────────────────────────────────────

    /// Create a confirmed account directly.
    pub fn seed_account(&self, email: &str, password: &str, full_name: Option<&str>) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            user_metadata: UserMetadata {
                full_name: full_name.map(str::to_string),
            },
        };
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                user: user.clone(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        user
    }

    /// Issue a one-time verification token for an account, as the
    /// verification email would carry.
    pub fn issue_otp(&self, email: &str) -> Option<String> {
        let account = self.accounts.get(&email.to_lowercase())?;
        let token = Uuid::new_v4().simple().to_string();
        self.otp_tokens.insert(token.clone(), account.user.id);
        Some(token)
    }

    /// Issue an authorization code for an account.
    pub fn issue_auth_code(&self, email: &str) -> Option<String> {
        let account = self.accounts.get(&email.to_lowercase())?;
        let code = Uuid::new_v4().simple().to_string();
        self.auth_codes.insert(code.clone(), account.user.id);
        Some(code)
    }

    /// Session for a seeded account, bypassing the password check.
    pub fn session_for(&self, user: &AuthUser) -> Result<AuthSession, AppError> {
        self.issue_session(user)
    }

    /// Store a profile as-is, assigning a row id if it has none.
    pub fn seed_profile(&self, mut profile: UserProfile) -> UserProfile {
        profile.id.get_or_insert_with(Uuid::new_v4);
        self.profiles.insert(profile.user_id, profile.clone());
        profile
    }

    pub fn seed_workout_session(&self, profile_id: Uuid, session: WorkoutSession) {
        self.workout_sessions
            .entry(profile_id)
            .or_default()
            .push(session);
    }

    pub fn seed_program(&self, program: WorkoutProgram) {
        self.programs.insert(program.id.clone(), program);
    }

    pub fn seed_progress_entry(&self, profile_id: Uuid, entry: ProgressEntry) {
        self.progress.entry(profile_id).or_default().push(entry);
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Make profile reads fail as if the backend were unreachable.
    pub fn set_fail_profile_reads(&self, fail: bool) {
        self.fail_profile_reads.store(fail, Ordering::SeqCst);
    }

    /// Make profile writes fail as if the backend rejected them.
    pub fn set_fail_profile_writes(&self, fail: bool) {
        self.fail_profile_writes.store(fail, Ordering::SeqCst);
    }

    fn check_profile_write(&self) -> Result<(), AppError> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(AppError::Backend("profile write rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AppError> {
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Auth(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let key = request.email.to_lowercase();
        let user = match self.accounts.entry(key) {
            Entry::Occupied(_) => {
                return Err(AppError::Auth("User already registered".to_string()));
            }
            Entry::Vacant(slot) => {
                let user = AuthUser {
                    id: Uuid::new_v4(),
                    email: Some(request.email.clone()),
                    user_metadata: UserMetadata {
                        full_name: Some(request.full_name.clone()),
                    },
                };
                slot.insert(Account {
                    user: user.clone(),
                    password: request.password.clone(),
                    confirmed: !self.require_email_confirmation,
                });
                user
            }
        };

        tracing::debug!(user_id = %user.id, "Account created in memory backend");

        if self.require_email_confirmation {
            Ok(SignUpOutcome::VerificationRequired(user))
        } else {
            Ok(SignUpOutcome::SignedIn(self.issue_session(&user)?))
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let account = self
            .accounts
            .get(&email.to_lowercase())
            .map(|a| a.value().clone())
            .filter(|a| a.password == password)
            .ok_or_else(|| AppError::Auth("Invalid login credentials".to_string()))?;

        if !account.confirmed {
            return Err(AppError::Auth("Email not confirmed".to_string()));
        }
        self.issue_session(&account.user)
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn verify_otp(&self, token_hash: &str, _kind: OtpType) -> Result<AuthSession, AppError> {
        let (_, user_id) = self
            .otp_tokens
            .remove(token_hash)
            .ok_or_else(|| AppError::Auth("Token has expired or is invalid".to_string()))?;
        let user = self
            .confirm(user_id)
            .ok_or_else(|| AppError::Auth("User not found".to_string()))?;
        self.issue_session(&user)
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        _code_verifier: Option<&str>,
    ) -> Result<AuthSession, AppError> {
        let (_, user_id) = self
            .auth_codes
            .remove(code)
            .ok_or_else(|| AppError::Auth("Invalid authorization code".to_string()))?;
        let account = self
            .account_by_id(user_id)
            .ok_or_else(|| AppError::Auth("User not found".to_string()))?;
        self.issue_session(&account.user)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        if self.fail_profile_reads.load(Ordering::SeqCst) {
            return Err(AppError::BackendUnavailable(
                "profile read failed".to_string(),
            ));
        }
        Ok(self.profiles.get(&user_id).map(|p| p.value().clone()))
    }

    async fn insert_profile_if_absent(&self, profile: &UserProfile) -> Result<bool, AppError> {
        self.check_profile_write()?;
        match self.profiles.entry(profile.user_id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let mut row = profile.clone();
                row.id.get_or_insert_with(Uuid::new_v4);
                row.created_at.get_or_insert(now);
                row.updated_at.get_or_insert(now);
                slot.insert(row);
                Ok(true)
            }
        }
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile, AppError> {
        self.check_profile_write()?;
        let now = Utc::now();
        let mut row = profile.clone();

        let mut entry = self.profiles.entry(profile.user_id).or_insert_with(|| {
            let mut fresh = UserProfile::new(profile.user_id);
            fresh.id = Some(Uuid::new_v4());
            fresh.created_at = Some(now);
            fresh
        });
        let existing = entry.value_mut();

        // Merge semantics: row identity and creation time stay with the row.
        row.id = existing.id.or(row.id);
        row.created_at = existing.created_at.or(row.created_at);
        row.updated_at = Some(row.updated_at.unwrap_or(now));
        *existing = row.clone();
        Ok(row)
    }

    async fn list_workout_sessions(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<WorkoutSession>, AppError> {
        let mut sessions: Vec<WorkoutSession> = self
            .workout_sessions
            .get(&query.profile_id)
            .map(|s| s.value().clone())
            .unwrap_or_default()
            .into_iter()
            .filter(|s| {
                query
                    .date_filter
                    .map_or(true, |f| f.matches(s.date.date_naive()))
            })
            .collect();

        match query.order {
            SortOrder::Ascending => sessions.sort_by(|a, b| a.date.cmp(&b.date)),
            SortOrder::Descending => sessions.sort_by(|a, b| b.date.cmp(&a.date)),
        }
        if let Some(limit) = query.limit {
            sessions.truncate(limit as usize);
        }
        Ok(sessions)
    }

    async fn list_workout_programs(
        &self,
        query: &ProgramQuery,
    ) -> Result<Vec<WorkoutProgram>, AppError> {
        let creator = query.creator_id.map(|id| id.to_string());
        let mut programs: Vec<WorkoutProgram> = self
            .programs
            .iter()
            .map(|p| p.value().clone())
            .filter(|p| creator.is_none() || p.creator_id == creator)
            .filter(|p| !query.public_only || p.is_public)
            .collect();
        programs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(programs)
    }

    async fn list_progress_entries(
        &self,
        profile_id: Uuid,
        limit: u32,
    ) -> Result<Vec<ProgressEntry>, AppError> {
        let mut entries = self
            .progress
            .get(&profile_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries.truncate(limit as usize);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FitnessLevel, Gender};

    const SECRET: &[u8] = b"memory_backend_test_secret_32byt";

    fn sign_up_request(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "hunter22".to_string(),
            full_name: "Test User".to_string(),
            email_redirect_to: "http://localhost:3000/auth/callback".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_requires_verification_then_sign_in() {
        let backend = MemoryBackend::new(SECRET);
        let outcome = backend.sign_up(&sign_up_request("a@example.com")).await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::VerificationRequired(_)));

        let err = backend
            .sign_in_with_password("a@example.com", "hunter22")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Email not confirmed");

        let token = backend.issue_otp("a@example.com").unwrap();
        backend.verify_otp(&token, OtpType::Signup).await.unwrap();
        // One-time: the second use fails.
        assert!(backend.verify_otp(&token, OtpType::Signup).await.is_err());

        let session = backend
            .sign_in_with_password("A@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(session.user.email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_rejected() {
        let backend = MemoryBackend::new(SECRET).with_autoconfirm();
        let outcome = backend.sign_up(&sign_up_request("b@example.com")).await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn(_)));
        let err = backend
            .sign_up(&sign_up_request("b@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "User already registered");
    }

    #[tokio::test]
    async fn test_upsert_is_keyed_by_user_id() {
        let backend = MemoryBackend::new(SECRET);
        let user_id = Uuid::new_v4();
        let mut profile = UserProfile::new(user_id);
        profile.first_name = Some("First".to_string());

        let first = backend.upsert_profile(&profile).await.unwrap();
        profile.first_name = Some("Second".to_string());
        profile.gender = Some(Gender::Other);
        profile.fitness_level = Some(FitnessLevel::Advanced);
        let second = backend.upsert_profile(&profile).await.unwrap();

        assert_eq!(backend.profile_count(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        let stored = backend.get_profile(user_id).await.unwrap().unwrap();
        assert_eq!(stored.first_name.as_deref(), Some("Second"));
    }

    #[tokio::test]
    async fn test_insert_if_absent_never_overwrites() {
        let backend = MemoryBackend::new(SECRET);
        let user_id = Uuid::new_v4();
        let stub = UserProfile::stub(user_id, None, Some("Stub Name"));
        assert!(backend.insert_profile_if_absent(&stub).await.unwrap());

        let other = UserProfile::stub(user_id, None, Some("Other Name"));
        assert!(!backend.insert_profile_if_absent(&other).await.unwrap());
        let stored = backend.get_profile(user_id).await.unwrap().unwrap();
        assert_eq!(stored.first_name.as_deref(), Some("Stub"));
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let backend = MemoryBackend::new(SECRET);
        backend.set_fail_profile_reads(true);
        assert!(matches!(
            backend.get_profile(Uuid::new_v4()).await,
            Err(AppError::BackendUnavailable(_))
        ));
        backend.set_fail_profile_writes(true);
        assert!(backend
            .upsert_profile(&UserProfile::new(Uuid::new_v4()))
            .await
            .is_err());
    }
}
