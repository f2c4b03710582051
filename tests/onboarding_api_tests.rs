// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API tests: authentication, the onboarding form round-trips and
//! the profile submit.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use elevateu::backend::Backend;
use elevateu::models::{AuthUser, FitnessLevel};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

fn full_draft() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "age": 36,
        "gender": "Female",
        "heightCm": 165,
        "weightKg": 58.5,
        "fitnessLevel": "Intermediate",
        "medicalHistory": "",
        "lifestyleHabits": "Walks daily"
    })
}

fn wizard(step: u8, mode: &str, draft: Value) -> Value {
    json!({ "step": step, "mode": mode, "draft": draft })
}

fn seed_user(backend: &elevateu::backend::MemoryBackend) -> (AuthUser, String) {
    let user = backend.seed_account("ada@example.com", "hunter22", Some("Ada Lovelace"));
    let cookie = common::session_cookie(&user);
    (user, cookie)
}

#[tokio::test]
async fn test_api_requires_session() {
    let (app, _) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(common::get("/api/me", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "unauthorized");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::AUTHORIZATION, "Bearer garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_me_with_bearer_token_and_no_profile() {
    let (app, backend) = common::create_test_app();
    let (user, _) = seed_user(&backend);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", common::session_token(&user)),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["userId"], user.id.to_string());
    assert_eq!(body["email"], "ada@example.com");
    assert!(body["profile"].is_null());
    assert_eq!(body["profileComplete"], false);
    assert_eq!(body["missingFields"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_next_validates_only_current_page() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    // Short first name on page 1; the later pages are empty but unchecked.
    let draft = json!({ "firstName": "A", "lastName": "Lovelace" });
    let response = app
        .clone()
        .oneshot(common::post_json(
            "/api/onboarding/next",
            Some(&cookie),
            &wizard(1, "complete", draft),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["state"]["step"], 1);
    assert_eq!(
        body["state"]["errors"],
        json!({ "firstName": ["First name is required"] })
    );
    // The read-only email is filled from the account.
    assert_eq!(body["state"]["draft"]["email"], "ada@example.com");

    let draft = json!({ "firstName": "Ada", "lastName": "Lovelace" });
    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/next",
            Some(&cookie),
            &wizard(1, "complete", draft),
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["state"]["step"], 2);
    assert_eq!(body["state"]["errors"], json!({}));
    assert_eq!(body["stepTitle"], "Physical");
    assert_eq!(body["canGoBack"], true);
    assert_eq!(body["isLastStep"], false);
    assert_eq!(body["showStepIndicator"], true);
    assert_eq!(body["totalSteps"], 4);
}

#[tokio::test]
async fn test_next_reports_range_errors_and_bmi() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let mut draft = full_draft();
    draft["weightKg"] = json!(400);
    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/next",
            Some(&cookie),
            &wizard(2, "complete", draft),
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["state"]["step"], 2);
    assert_eq!(
        body["state"]["errors"]["weightKg"],
        json!(["Weight must be between 30 and 300 kg"])
    );
    assert_eq!(body["bmi"]["value"], 146.9);
}

#[tokio::test]
async fn test_back_never_validates() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let response = app
        .clone()
        .oneshot(common::post_json(
            "/api/onboarding/back",
            Some(&cookie),
            &wizard(3, "update", json!({ "age": 5 })),
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["state"]["step"], 2);
    assert_eq!(body["state"]["errors"], json!({}));
    assert_eq!(body["showStepIndicator"], false);

    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/back",
            Some(&cookie),
            &wizard(1, "update", json!({})),
        ))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["state"]["step"], 1);
    assert_eq!(body["canGoBack"], false);
}

#[tokio::test]
async fn test_malformed_state_is_rejected() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/next",
            Some(&cookie),
            &json!({ "step": 9, "mode": "complete" }),
        ))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_submit_completes_onboarding() {
    let (app, backend) = common::create_test_app();
    let (user, cookie) = seed_user(&backend);

    let mut draft = full_draft();
    // Whatever the client sends, the account email is stored.
    draft["email"] = json!("spoofed@example.com");
    let response = app
        .clone()
        .oneshot(common::post_json(
            "/api/onboarding/submit",
            Some(&cookie),
            &wizard(4, "complete", draft),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(
        body["message"],
        "Profile completed! Let's start your fitness journey!"
    );
    assert_eq!(body["redirect"], "/dashboard");
    assert_eq!(body["state"]["submitting"], false);

    let stored = backend.get_profile(user.id).await.unwrap().unwrap();
    assert!(stored.is_complete());
    assert_eq!(stored.email.as_deref(), Some("ada@example.com"));
    assert_eq!(stored.fitness_level, Some(FitnessLevel::Intermediate));
    assert_eq!(stored.medical_history, None);
    assert_eq!(stored.lifestyle_habits.as_deref(), Some("Walks daily"));

    // The gate now treats onboarding as finished.
    let response = app
        .oneshot(common::get("/complete-profile", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_resubmit_updates_same_row() {
    let (app, backend) = common::create_test_app();
    let (user, cookie) = seed_user(&backend);

    let response = app
        .clone()
        .oneshot(common::post_json(
            "/api/onboarding/submit",
            Some(&cookie),
            &wizard(4, "complete", full_draft()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = backend.get_profile(user.id).await.unwrap().unwrap();

    let mut draft = full_draft();
    draft["weightKg"] = json!(61);
    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/submit",
            Some(&cookie),
            &wizard(1, "update", draft),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Profile updated successfully");
    assert!(body.get("redirect").is_none());

    assert_eq!(backend.profile_count(), 1);
    let second = backend.get_profile(user.id).await.unwrap().unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.weight_kg, Some(61.0));
}

#[tokio::test]
async fn test_submit_with_missing_fields() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let mut draft = full_draft();
    draft["lastName"] = json!("  ");
    draft["fitnessLevel"] = Value::Null;
    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/submit",
            Some(&cookie),
            &wizard(4, "complete", draft),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::body_json(response).await;
    assert_eq!(
        body["message"],
        "Please complete all required fields: lastName, fitnessLevel"
    );
    assert_eq!(body["state"]["step"], 1);
    assert_eq!(
        body["state"]["errors"],
        json!({ "lastName": ["Required"], "fitnessLevel": ["Required"] })
    );
    assert_eq!(backend.profile_count(), 0);
}

#[tokio::test]
async fn test_submit_without_fitness_level_returns_to_its_page() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let mut draft = full_draft();
    draft["fitnessLevel"] = Value::Null;
    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/submit",
            Some(&cookie),
            &wizard(4, "complete", draft),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::body_json(response).await;
    assert_eq!(
        body["message"],
        "Please complete all required fields: fitnessLevel"
    );
    assert_eq!(body["state"]["step"], 3);
    assert_eq!(
        body["state"]["errors"],
        json!({ "fitnessLevel": ["Required"] })
    );
    assert_eq!(backend.profile_count(), 0);
}

#[tokio::test]
async fn test_submit_rejects_padded_short_name() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let mut draft = full_draft();
    draft["firstName"] = json!(" A");
    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/submit",
            Some(&cookie),
            &wizard(4, "complete", draft),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::body_json(response).await;
    assert_eq!(body["state"]["step"], 1);
    assert_eq!(
        body["state"]["errors"]["firstName"],
        json!(["First name is required"])
    );
    assert_eq!(backend.profile_count(), 0);
}

#[tokio::test]
async fn test_fractional_age_is_reported_inline() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let mut draft = full_draft();
    draft["age"] = json!(30.5);
    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/next",
            Some(&cookie),
            &wizard(2, "complete", draft),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["state"]["step"], 2);
    assert_eq!(
        body["state"]["errors"]["age"],
        json!(["Age must be a whole number"])
    );
}

#[tokio::test]
async fn test_submit_with_out_of_range_age() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let mut draft = full_draft();
    draft["age"] = json!(12);
    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/submit",
            Some(&cookie),
            &wizard(4, "complete", draft),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Please fix the highlighted fields");
    assert_eq!(body["state"]["step"], 2);
    assert_eq!(
        body["state"]["errors"]["age"],
        json!(["Age must be between 13 and 120"])
    );
}

#[tokio::test]
async fn test_submit_while_in_flight_conflicts() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let mut state = wizard(4, "complete", full_draft());
    state["submitting"] = json!(true);
    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/submit",
            Some(&cookie),
            &state,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(backend.profile_count(), 0);
}

#[tokio::test]
async fn test_submit_backend_failure() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);
    backend.set_fail_profile_writes(true);

    let response = app
        .oneshot(common::post_json(
            "/api/onboarding/submit",
            Some(&cookie),
            &wizard(4, "complete", full_draft()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "backend_error");
}

#[tokio::test]
async fn test_bmi_endpoint() {
    let (app, backend) = common::create_test_app();
    let (_, cookie) = seed_user(&backend);

    let response = app
        .clone()
        .oneshot(common::get(
            "/api/bmi?heightCm=170&weightKg=70",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["bmi"]["value"], 24.2);

    let response = app
        .oneshot(common::get("/api/bmi?heightCm=0&weightKg=70", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
