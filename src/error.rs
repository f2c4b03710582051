// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Error reported by the backend auth service, already reduced to a
    /// user-facing message.
    #[error("{0}")]
    Auth(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Fallback shown when the backend gives no usable message.
    pub const GENERIC_AUTH_MESSAGE: &'static str = "Something went wrong";

    /// Message suitable for showing to the user as a single toast string.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Auth(msg) if !msg.trim().is_empty() => msg.clone(),
            AppError::Auth(_) => Self::GENERIC_AUTH_MESSAGE.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            _ => Self::GENERIC_AUTH_MESSAGE.to_string(),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Auth(_) => (StatusCode::BAD_REQUEST, "auth_error", Some(self.user_message())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::Backend(msg) => {
                tracing::error!(error = %msg, "Backend error");
                (StatusCode::BAD_GATEWAY, "backend_error", None)
            }
            AppError::BackendUnavailable(msg) => {
                tracing::error!(error = %msg, "Backend unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "backend_unavailable", None)
            }
            AppError::Cancelled => {
                tracing::debug!("Request work cancelled before completion");
                (StatusCode::SERVICE_UNAVAILABLE, "cancelled", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
