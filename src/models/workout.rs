// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout records read from the backend tables.
//!
//! These tables are owned elsewhere; the service only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::{deserialize_flexible_datetime, deserialize_optional_flexible_datetime};

/// Program reference embedded in a session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramRef {
    pub name: String,
}

/// Day reference embedded in a session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRef {
    pub day_number: u32,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

/// An exercise performed during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExercise {
    #[serde(default)]
    pub exercise: Option<ExerciseRef>,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
}

/// Row in `workout_sessions`, with embedded program/day/exercises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub program_id: Option<String>,
    #[serde(default)]
    pub workout_day_id: Option<String>,
    #[serde(default)]
    pub program: Option<ProgramRef>,
    #[serde(default)]
    pub workout_day: Option<DayRef>,
    #[serde(default)]
    pub session_exercises: Option<Vec<SessionExercise>>,
}

/// Day embedded in a program row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDay {
    pub id: String,
    pub day_number: u32,
    #[serde(default)]
    pub name: Option<String>,
}

/// Row in `workout_programs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutProgram {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub workout_days: Vec<WorkoutDay>,
}

impl WorkoutProgram {
    /// Case-insensitive substring match on name or description.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// Row in `progress_entries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_row_with_embeds() {
        let row = serde_json::json!({
            "id": "s1",
            "date": "2024-03-02",
            "programId": "p1",
            "program": { "name": "Push Pull Legs" },
            "workoutDay": { "dayNumber": 2, "name": null },
            "sessionExercises": [
                { "exercise": { "name": "Squat" }, "sets": [{ "reps": 5, "weightKg": 100 }] }
            ]
        });
        let session: WorkoutSession = serde_json::from_value(row).unwrap();
        assert_eq!(session.program.unwrap().name, "Push Pull Legs");
        assert_eq!(session.workout_day.unwrap().day_number, 2);
        let exercises = session.session_exercises.unwrap();
        assert_eq!(exercises[0].sets[0].weight_kg, Some(100.0));
    }

    #[test]
    fn test_program_search() {
        let program = WorkoutProgram {
            id: "p1".to_string(),
            name: "Upper Body Power".to_string(),
            description: Some("Chest, back and ARMS".to_string()),
            is_public: true,
            creator_id: None,
            created_at: None,
            workout_days: vec![],
        };
        assert!(program.matches_search("upper"));
        assert!(program.matches_search("arms"));
        assert!(program.matches_search("  "));
        assert!(!program.matches_search("legs"));
    }
}
