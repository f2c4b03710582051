// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod bmi;
pub mod profile;
pub mod session;
pub mod stats;
pub mod workout;

pub use bmi::{Bmi, BmiCategory};
pub use profile::{FitnessLevel, Gender, ProfileField, UserProfile};
pub use session::{AuthSession, AuthUser, SignUpOutcome, UserMetadata};
pub use stats::{SeriesPoint, WindowCounts};
pub use workout::{ProgressEntry, WorkoutProgram, WorkoutSession};
