// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout pages through the router: upcoming sessions, history,
//! program lists and templates.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use elevateu::backend::MemoryBackend;
use elevateu::models::{WorkoutProgram, WorkoutSession};
use tower::ServiceExt;
use uuid::Uuid;

mod common;

fn session(id: &str, days_from_today: i64) -> WorkoutSession {
    WorkoutSession {
        id: id.to_string(),
        date: Utc::now() + Duration::days(days_from_today),
        program_id: None,
        workout_day_id: None,
        program: None,
        workout_day: None,
        session_exercises: None,
    }
}

fn program(id: &str, name: &str, is_public: bool, creator: Option<Uuid>) -> WorkoutProgram {
    WorkoutProgram {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} description")),
        is_public,
        creator_id: creator.map(|c| c.to_string()),
        created_at: Some(Utc::now()),
        workout_days: Vec::new(),
    }
}

/// Signed-in user with a complete profile; returns the cookie and the
/// profile row id.
fn onboarded(backend: &MemoryBackend) -> (String, Uuid) {
    let user = backend.seed_account("lifter@example.com", "hunter22", None);
    let profile = backend.seed_profile(common::complete_profile(&user));
    (common::session_cookie(&user), profile.id.unwrap())
}

#[tokio::test]
async fn test_current_and_completed_split_on_today() {
    let (app, backend) = common::create_test_app();
    let (cookie, profile_id) = onboarded(&backend);

    for (id, offset) in [("past2", -2), ("past1", -1), ("next1", 1), ("next3", 3)] {
        backend.seed_workout_session(profile_id, session(id, offset));
    }

    let response = app
        .clone()
        .oneshot(common::get("/current-workouts", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let ids: Vec<&str> = body["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["next1", "next3"]);
    // Nothing logged today, so no streak.
    assert_eq!(body["currentStreak"], 0);

    let response = app
        .oneshot(common::get("/completed-workouts", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let ids: Vec<&str> = body["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["past1", "past2"]);
    assert_eq!(body["counts"]["thisWeek"], 2);
}

#[tokio::test]
async fn test_program_filters() {
    let (app, backend) = common::create_test_app();
    let (cookie, profile_id) = onboarded(&backend);

    backend.seed_program(program("p1", "Push Pull Legs", true, None));
    backend.seed_program(program("p2", "My Split", false, Some(profile_id)));
    backend.seed_program(program("p3", "Someone Else", false, Some(Uuid::new_v4())));

    let count = |body: &serde_json::Value| body["programs"].as_array().unwrap().len();

    let response = app
        .clone()
        .oneshot(common::get("/all-workouts", Some(&cookie)))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["filter"], "all");
    assert_eq!(count(&body), 3);

    let response = app
        .clone()
        .oneshot(common::get("/all-workouts?filter=mine", Some(&cookie)))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(count(&body), 1);
    assert_eq!(body["programs"][0]["id"], "p2");

    let response = app
        .clone()
        .oneshot(common::get("/all-workouts?filter=public", Some(&cookie)))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(count(&body), 1);
    assert_eq!(body["programs"][0]["id"], "p1");

    let response = app
        .oneshot(common::get("/all-workouts?q=SPLIT", Some(&cookie)))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["query"], "SPLIT");
    assert_eq!(count(&body), 1);
}

#[tokio::test]
async fn test_templates_search() {
    let (app, backend) = common::create_test_app();
    let (cookie, _) = onboarded(&backend);

    let response = app
        .clone()
        .oneshot(common::get("/templates", Some(&cookie)))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["templates"].as_array().unwrap().len(), 6);

    let response = app
        .clone()
        .oneshot(common::get("/templates?difficulty=Advanced", Some(&cookie)))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["templates"].as_array().unwrap().len(), 2);

    let response = app
        .oneshot(common::get("/templates?difficulty=Expert", Some(&cookie)))
        .await
        .unwrap();
    let body = common::body_json(response).await;
    assert!(body["templates"].as_array().unwrap().is_empty());
}
