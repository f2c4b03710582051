// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout history, program browsing and the template catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::{Backend, DateFilter, ProgramQuery, SessionDetail, SessionQuery, SortOrder};
use crate::error::Result;
use crate::models::stats::{current_streak, window_counts};
use crate::models::{FitnessLevel, WindowCounts, WorkoutProgram, WorkoutSession};

const UPCOMING_LIMIT: u32 = 10;
const COMPLETED_LIMIT: u32 = 50;
/// Exercise names listed per completed session before "+N more".
const EXERCISE_PREVIEW: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWorkoutsView {
    /// Sessions scheduled today or later, soonest first.
    pub sessions: Vec<WorkoutSession>,
    pub current_streak: u32,
}

/// Sessions from today on, plus the streak over all past sessions.
pub async fn current_workouts(
    backend: &dyn Backend,
    profile_id: Option<Uuid>,
    today: NaiveDate,
) -> Result<CurrentWorkoutsView> {
    let Some(profile_id) = profile_id else {
        return Ok(CurrentWorkoutsView {
            sessions: Vec::new(),
            current_streak: 0,
        });
    };

    let upcoming = SessionQuery {
        profile_id,
        date_filter: Some(DateFilter::OnOrAfter(today)),
        order: SortOrder::Ascending,
        limit: Some(UPCOMING_LIMIT),
        detail: SessionDetail::Plan,
    };
    let history = SessionQuery::dates(profile_id);

    let (sessions, all) = tokio::try_join!(
        backend.list_workout_sessions(&upcoming),
        backend.list_workout_sessions(&history),
    )?;

    let dates: Vec<DateTime<Utc>> = all.iter().map(|s| s.date).collect();
    Ok(CurrentWorkoutsView {
        current_streak: current_streak(&dates, today),
        sessions,
    })
}

/// A finished session as listed in the history view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSessionView {
    pub id: String,
    pub date: DateTime<Utc>,
    pub program_name: Option<String>,
    pub day_number: Option<u32>,
    pub day_name: Option<String>,
    pub exercises: Vec<String>,
    /// Exercises not listed in `exercises`.
    pub more_exercises: usize,
}

impl From<WorkoutSession> for CompletedSessionView {
    fn from(s: WorkoutSession) -> Self {
        let names: Vec<String> = s
            .session_exercises
            .unwrap_or_default()
            .into_iter()
            .filter_map(|e| e.exercise.map(|x| x.name))
            .collect();
        let more_exercises = names.len().saturating_sub(EXERCISE_PREVIEW);

        Self {
            id: s.id,
            date: s.date,
            program_name: s.program.map(|p| p.name),
            day_number: s.workout_day.as_ref().map(|d| d.day_number),
            day_name: s.workout_day.and_then(|d| d.name),
            exercises: names.into_iter().take(EXERCISE_PREVIEW).collect(),
            more_exercises,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWorkoutsView {
    pub sessions: Vec<CompletedSessionView>,
    pub counts: WindowCounts,
}

/// Latest sessions dated before today, with rolling counts over them.
pub async fn completed_workouts(
    backend: &dyn Backend,
    profile_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<CompletedWorkoutsView> {
    let Some(profile_id) = profile_id else {
        return Ok(CompletedWorkoutsView {
            sessions: Vec::new(),
            counts: WindowCounts::default(),
        });
    };

    let query = SessionQuery {
        profile_id,
        date_filter: Some(DateFilter::Before(now.date_naive())),
        order: SortOrder::Descending,
        limit: Some(COMPLETED_LIMIT),
        detail: SessionDetail::Exercises,
    };
    let sessions = backend.list_workout_sessions(&query).await?;

    let dates: Vec<DateTime<Utc>> = sessions.iter().map(|s| s.date).collect();
    Ok(CompletedWorkoutsView {
        counts: window_counts(&dates, now),
        sessions: sessions.into_iter().map(Into::into).collect(),
    })
}

/// Program list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramFilter {
    #[default]
    All,
    Mine,
    Public,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramListQuery {
    #[serde(default)]
    pub filter: ProgramFilter,
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllWorkoutsView {
    pub filter: ProgramFilter,
    pub query: String,
    pub programs: Vec<WorkoutProgram>,
}

/// Programs newest first, narrowed by filter and free-text search.
pub async fn all_workouts(
    backend: &dyn Backend,
    profile_id: Option<Uuid>,
    params: &ProgramListQuery,
) -> Result<AllWorkoutsView> {
    let query_text = params.q.clone().unwrap_or_default();

    let query = match (params.filter, profile_id) {
        (ProgramFilter::All, _) => ProgramQuery::default(),
        (ProgramFilter::Public, _) => ProgramQuery {
            public_only: true,
            ..Default::default()
        },
        (ProgramFilter::Mine, Some(id)) => ProgramQuery {
            creator_id: Some(id),
            ..Default::default()
        },
        // Without a profile row nothing can be "mine".
        (ProgramFilter::Mine, None) => {
            return Ok(AllWorkoutsView {
                filter: params.filter,
                query: query_text,
                programs: Vec::new(),
            });
        }
    };

    let programs = backend
        .list_workout_programs(&query)
        .await?
        .into_iter()
        .filter(|p| p.matches_search(&query_text))
        .collect();

    Ok(AllWorkoutsView {
        filter: params.filter,
        query: query_text,
        programs,
    })
}

/// Predefined workout plan shown on the templates page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub difficulty: FitnessLevel,
    pub duration: &'static str,
    pub focus: &'static [&'static str],
}

pub const TEMPLATES: [WorkoutTemplate; 6] = [
    WorkoutTemplate {
        id: "1",
        name: "Full Body Strength",
        description: "Complete upper and lower body workout for building muscle",
        difficulty: FitnessLevel::Intermediate,
        duration: "45-60 min",
        focus: &["Strength", "Muscle Building", "Full Body"],
    },
    WorkoutTemplate {
        id: "2",
        name: "HIIT Cardio Blast",
        description: "High-intensity interval training for maximum calorie burn",
        difficulty: FitnessLevel::Advanced,
        duration: "20-30 min",
        focus: &["Cardio", "Fat Loss", "Endurance"],
    },
    WorkoutTemplate {
        id: "3",
        name: "Beginner Foundation",
        description: "Perfect starting point for fitness newcomers",
        difficulty: FitnessLevel::Beginner,
        duration: "30-45 min",
        focus: &["Foundation", "Mobility", "Form"],
    },
    WorkoutTemplate {
        id: "4",
        name: "Core & Abs",
        description: "Targeted core strengthening and ab sculpting",
        difficulty: FitnessLevel::Intermediate,
        duration: "25-35 min",
        focus: &["Core", "Abs", "Stability"],
    },
    WorkoutTemplate {
        id: "5",
        name: "Upper Body Power",
        description: "Build chest, back, shoulders, and arms",
        difficulty: FitnessLevel::Intermediate,
        duration: "40-50 min",
        focus: &["Upper Body", "Strength", "Power"],
    },
    WorkoutTemplate {
        id: "6",
        name: "Lower Body Blast",
        description: "Legs, glutes, and lower body strength",
        difficulty: FitnessLevel::Advanced,
        duration: "45-55 min",
        focus: &["Lower Body", "Legs", "Glutes"],
    },
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// A fitness level, or `all`.
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Templates matching a search string and difficulty. An unknown
/// difficulty matches nothing.
pub fn find_templates(query: &TemplateQuery) -> Vec<WorkoutTemplate> {
    let needle = query.q.as_deref().unwrap_or_default().trim().to_lowercase();
    let difficulty = match query.difficulty.as_deref() {
        None | Some("") | Some("all") => None,
        Some(level) => match level.parse::<FitnessLevel>() {
            Ok(level) => Some(level),
            Err(_) => return Vec::new(),
        },
    };

    TEMPLATES
        .iter()
        .filter(|t| {
            needle.is_empty()
                || t.name.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
        })
        .filter(|t| difficulty.map_or(true, |d| t.difficulty == d))
        .cloned()
        .collect()
}
