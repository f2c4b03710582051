// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use elevateu::error::AppError;

async fn error_body(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn test_user_message_uses_backend_text() {
    let err = AppError::Auth("Email not confirmed".to_string());
    assert_eq!(err.user_message(), "Email not confirmed");

    let err = AppError::Auth("   ".to_string());
    assert_eq!(err.user_message(), AppError::GENERIC_AUTH_MESSAGE);

    let err = AppError::BadRequest("Height and weight must be positive numbers".to_string());
    assert_eq!(
        err.user_message(),
        "Height and weight must be positive numbers"
    );
}

#[test]
fn test_user_message_hides_internal_details() {
    let err = AppError::Backend("HTTP 500: relation does not exist".to_string());
    assert_eq!(err.user_message(), "Something went wrong");

    let err = AppError::Internal(anyhow::anyhow!("secret stack trace"));
    assert_eq!(err.user_message(), "Something went wrong");
}

#[tokio::test]
async fn test_error_status_mapping() {
    let (status, body) = error_body(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = error_body(AppError::Auth("Invalid login credentials".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Invalid login credentials");

    let (status, _) = error_body(AppError::Conflict("busy".into())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = error_body(AppError::BackendUnavailable("timeout".into())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_backend_errors_do_not_leak_details() {
    let (status, body) = error_body(AppError::Backend("HTTP 500: db password wrong".into())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, serde_json::json!({ "error": "backend_error" }));

    let (status, body) = error_body(AppError::Internal(anyhow::anyhow!("boom"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "internal_error" }));
}
