// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ElevateU: fitness tracking with guided profile onboarding
//!
//! This crate provides the web backend: session handling and the
//! onboarding route gate, the multi-step profile form, auth flows, and
//! dashboard and workout history views. All durable state lives in a
//! hosted auth + data backend reached through [`backend::Backend`].

pub mod backend;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use backend::Backend;
use config::Config;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn Backend>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        Self { config, backend }
    }
}
