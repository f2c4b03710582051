// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard view: profile summary, BMI and workout stats.
//!
//! The session and progress queries run as separate tasks. Both are tied
//! to a cancellation token whose drop guard lives in [`load_dashboard`],
//! so they stop as soon as the request future is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, SessionQuery};
use crate::error::{AppError, Result};
use crate::models::stats::{current_streak, weekly_frequency, weight_trend};
use crate::models::{Bmi, SeriesPoint, UserProfile};

/// Sessions considered for the dashboard totals.
const RECENT_SESSIONS_LIMIT: u32 = 30;
/// Progress entries plotted in the weight chart.
const WEIGHT_ENTRIES_LIMIT: u32 = 14;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_workouts: u32,
    pub current_streak: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub profile: UserProfile,
    pub bmi: Option<Bmi>,
    pub stats: DashboardStats,
    pub weekly_frequency: Vec<SeriesPoint>,
    pub weight_trend: Vec<SeriesPoint>,
}

/// Run `fut` unless `token` is cancelled first.
async fn cancellable<T>(
    token: CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        _ = token.cancelled() => Err(AppError::Cancelled),
        result = fut => result,
    }
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::Internal(anyhow::Error::new(e).context("dashboard task failed"))
}

pub async fn load_dashboard(
    backend: Arc<dyn Backend>,
    profile: UserProfile,
    now: DateTime<Utc>,
) -> Result<DashboardView> {
    let today = now.date_naive();
    let bmi = Bmi::from_optional(profile.height_cm, profile.weight_kg);

    let Some(profile_id) = profile.id else {
        return Ok(DashboardView {
            profile,
            bmi,
            stats: DashboardStats::default(),
            weekly_frequency: weekly_frequency(&[], today),
            weight_trend: Vec::new(),
        });
    };

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let sessions_task = {
        let backend = backend.clone();
        let query = SessionQuery {
            limit: Some(RECENT_SESSIONS_LIMIT),
            ..SessionQuery::dates(profile_id)
        };
        tokio::spawn(cancellable(cancel.child_token(), async move {
            backend.list_workout_sessions(&query).await
        }))
    };
    let progress_task = tokio::spawn(cancellable(cancel.child_token(), async move {
        backend
            .list_progress_entries(profile_id, WEIGHT_ENTRIES_LIMIT)
            .await
    }));

    let sessions = sessions_task.await.map_err(join_error)??;

    // The chart is decoration; a failed progress query leaves it empty.
    let progress = match progress_task.await.map_err(join_error)? {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(%profile_id, error = %e, "Progress entries unavailable");
            Vec::new()
        }
    };

    let dates: Vec<DateTime<Utc>> = sessions.iter().map(|s| s.date).collect();
    tracing::debug!(%profile_id, sessions = dates.len(), "Dashboard loaded");

    Ok(DashboardView {
        profile,
        bmi,
        stats: DashboardStats {
            total_workouts: dates.len() as u32,
            current_streak: current_streak(&dates, today),
        },
        weekly_frequency: weekly_frequency(&dates, today),
        weight_trend: weight_trend(&progress),
    })
}
