// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the hosted auth + data service.
//!
//! Auth calls go to the GoTrue-style API under `/auth/v1` with the public
//! anon key. Table access goes to the PostgREST-style API under
//! `/rest/v1` with the service key. Every call is attempted once; there
//! are no retries.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use super::{
    tables, Backend, DateFilter, OtpType, ProgramQuery, SessionDetail, SessionQuery,
    SignUpRequest, SortOrder,
};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    AuthSession, AuthUser, ProgressEntry, SignUpOutcome, UserProfile, WorkoutProgram,
    WorkoutSession,
};

const SESSION_SELECT_DATES: &str = "id,date";
const SESSION_SELECT_PLAN: &str =
    "id,date,programId,workoutDayId,program:workout_programs(name),workoutDay:workout_days(dayNumber,name)";
const SESSION_SELECT_EXERCISES: &str = "id,date,programId,workoutDayId,program:workout_programs(name),workoutDay:workout_days(dayNumber,name),sessionExercises:session_exercises(exercise:Exercise(name),sets(reps,weightKg))";
const PROGRAM_SELECT: &str =
    "id,name,description,isPublic,creatorId,createdAt,workoutDays:workout_days(id,dayNumber,name)";

/// Error body shapes returned by the auth API.
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self) -> Option<String> {
        [self.msg, self.error_description, self.message, self.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}

/// Hosted backend client.
#[derive(Clone)]
pub struct SupabaseBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_key: String,
}

impl SupabaseBackend {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.backend_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.backend_url.clone(),
            anon_key: config.backend_anon_key.clone(),
            service_key: config.backend_service_key.clone(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// POST to the auth API and parse the JSON body.
    async fn auth_post<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .post(self.auth_url(path))
            .header("apikey", &self.anon_key)
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::BackendUnavailable(e.to_string()))?;

        let response = Self::check_auth_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
    }

    /// Map a failed auth response to the backend's own message.
    async fn check_auth_response(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AuthErrorBody>(&body)
            .ok()
            .and_then(AuthErrorBody::into_message)
            .unwrap_or_else(|| AppError::GENERIC_AUTH_MESSAGE.to_string());

        tracing::warn!(status = %status, message = %message, "Auth request rejected");
        Err(AppError::Auth(message))
    }

    /// Generic table GET with JSON response.
    async fn rest_get<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .http
            .get(self.rest_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::BackendUnavailable(e.to_string()))?;

        Self::check_rest_response_json(response).await
    }

    /// Table POST (insert/upsert) returning the written rows.
    async fn rest_post<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
        prefer: &str,
        body: &serde_json::Value,
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .http
            .post(self.rest_url(table))
            .header("apikey", &self.service_key)
            .header("Prefer", prefer)
            .bearer_auth(&self.service_key)
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::BackendUnavailable(e.to_string()))?;

        Self::check_rest_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_rest_response_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
    }
}

fn order_param(column: &str, order: SortOrder) -> String {
    match order {
        SortOrder::Ascending => format!("{column}.asc"),
        SortOrder::Descending => format!("{column}.desc"),
    }
}

/// PostgREST query pairs for a session query.
fn session_query_params(query: &SessionQuery) -> Vec<(String, String)> {
    let select = match query.detail {
        SessionDetail::Dates => SESSION_SELECT_DATES,
        SessionDetail::Plan => SESSION_SELECT_PLAN,
        SessionDetail::Exercises => SESSION_SELECT_EXERCISES,
    };

    let mut params = vec![
        ("select".to_string(), select.to_string()),
        ("userId".to_string(), format!("eq.{}", query.profile_id)),
    ];
    match query.date_filter {
        Some(DateFilter::OnOrAfter(day)) => {
            params.push(("date".to_string(), format!("gte.{}", day.format("%Y-%m-%d"))))
        }
        Some(DateFilter::Before(day)) => {
            params.push(("date".to_string(), format!("lt.{}", day.format("%Y-%m-%d"))))
        }
        None => {}
    }
    params.push(("order".to_string(), order_param("date", query.order)));
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn program_query_params(query: &ProgramQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), PROGRAM_SELECT.to_string()),
        (
            "order".to_string(),
            order_param("createdAt", SortOrder::Descending),
        ),
    ];
    if let Some(creator) = query.creator_id {
        params.push(("creatorId".to_string(), format!("eq.{creator}")));
    }
    if query.public_only {
        params.push(("isPublic".to_string(), "eq.true".to_string()));
    }
    params
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AppError> {
        let body = serde_json::json!({
            "email": request.email,
            "password": request.password,
            "data": { "full_name": request.full_name },
        });

        let value: serde_json::Value = self
            .auth_post(
                "signup",
                &[("redirect_to", request.email_redirect_to.as_str())],
                &body,
            )
            .await?;

        // With autoconfirm a full session comes back; otherwise only the user.
        if value.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(value)
                .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))?;
            Ok(SignUpOutcome::SignedIn(session))
        } else {
            let user: AuthUser = serde_json::from_value(value)
                .map_err(|_| AppError::Auth("Failed to create account".to_string()))?;
            Ok(SignUpOutcome::VerificationRequired(user))
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.auth_post("token", &[("grant_type", "password")], &body)
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::BackendUnavailable(e.to_string()))?;

        Self::check_auth_response(response).await?;
        Ok(())
    }

    async fn verify_otp(&self, token_hash: &str, kind: OtpType) -> Result<AuthSession, AppError> {
        let body = serde_json::json!({ "type": kind, "token_hash": token_hash });
        self.auth_post("verify", &[], &body).await
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<AuthSession, AppError> {
        let body = serde_json::json!({
            "auth_code": code,
            "code_verifier": code_verifier.unwrap_or_default(),
        });
        self.auth_post("token", &[("grant_type", "pkce")], &body)
            .await
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let rows: Vec<UserProfile> = self
            .rest_get(
                tables::USER_PROFILES,
                &[
                    ("select".to_string(), "*".to_string()),
                    ("user_id".to_string(), format!("eq.{user_id}")),
                    ("limit".to_string(), "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile_if_absent(&self, profile: &UserProfile) -> Result<bool, AppError> {
        let body = serde_json::to_value(profile)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Profile encode failed: {}", e)))?;
        let rows: Vec<UserProfile> = self
            .rest_post(
                tables::USER_PROFILES,
                &[("on_conflict", "user_id")],
                "resolution=ignore-duplicates,return=representation",
                &body,
            )
            .await?;
        Ok(!rows.is_empty())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<UserProfile, AppError> {
        let body = serde_json::to_value(profile)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Profile encode failed: {}", e)))?;
        let rows: Vec<UserProfile> = self
            .rest_post(
                tables::USER_PROFILES,
                &[("on_conflict", "user_id")],
                "resolution=merge-duplicates,return=representation",
                &body,
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Backend("Upsert returned no row".to_string()))
    }

    async fn list_workout_sessions(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<WorkoutSession>, AppError> {
        self.rest_get(tables::WORKOUT_SESSIONS, &session_query_params(query))
            .await
    }

    async fn list_workout_programs(
        &self,
        query: &ProgramQuery,
    ) -> Result<Vec<WorkoutProgram>, AppError> {
        self.rest_get(tables::WORKOUT_PROGRAMS, &program_query_params(query))
            .await
    }

    async fn list_progress_entries(
        &self,
        profile_id: Uuid,
        limit: u32,
    ) -> Result<Vec<ProgressEntry>, AppError> {
        self.rest_get(
            tables::PROGRESS_ENTRIES,
            &[
                ("select".to_string(), "date,weightKg".to_string()),
                ("userId".to_string(), format!("eq.{profile_id}")),
                ("order".to_string(), "date.desc".to_string()),
                ("limit".to_string(), limit.to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_auth_error_message_precedence() {
        let body: AuthErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#,
        )
        .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Email not confirmed"));

        let body: AuthErrorBody =
            serde_json::from_str(r#"{"code":400,"msg":"Invalid login credentials"}"#).unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Invalid login credentials")
        );

        let body: AuthErrorBody = serde_json::from_str(r#"{"msg":"  "}"#).unwrap();
        assert_eq!(body.into_message(), None);
    }

    #[test]
    fn test_session_query_params() {
        let profile_id = Uuid::nil();
        let query = SessionQuery {
            profile_id,
            date_filter: Some(DateFilter::OnOrAfter(
                NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            )),
            order: SortOrder::Ascending,
            limit: Some(10),
            detail: SessionDetail::Plan,
        };
        let params = session_query_params(&query);
        assert!(params.contains(&("date".to_string(), "gte.2024-06-15".to_string())));
        assert!(params.contains(&("order".to_string(), "date.asc".to_string())));
        assert!(params.contains(&("limit".to_string(), "10".to_string())));
        assert!(params.contains(&("userId".to_string(), format!("eq.{profile_id}"))));
    }

    #[test]
    fn test_program_query_params() {
        let params = program_query_params(&ProgramQuery {
            creator_id: None,
            public_only: true,
        });
        assert!(params.contains(&("isPublic".to_string(), "eq.true".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "creatorId"));
    }
}
