// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod countdown;
pub mod dashboard;
pub mod onboarding;
pub mod profile;
pub mod workouts;

pub use onboarding::{FormMode, ProfileDraft, Step, WizardState};
