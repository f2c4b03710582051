// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ElevateU API Server
//!
//! Serves the onboarding gate, auth flows and workout views on top of a
//! hosted auth + data backend.

use elevateu::{
    backend::{Backend, MemoryBackend, SupabaseBackend},
    config::{BackendMode, Config},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, mode = ?config.backend_mode, "Starting ElevateU API");

    let backend: Arc<dyn Backend> = match config.backend_mode {
        BackendMode::Remote => {
            tracing::info!(url = %config.backend_url, "Using hosted backend");
            Arc::new(SupabaseBackend::new(&config)?)
        }
        BackendMode::Memory => {
            tracing::warn!("Using in-memory backend; data is lost on restart");
            Arc::new(MemoryBackend::new(&config.jwt_secret).with_autoconfirm())
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), backend));

    // Build router
    let app = elevateu::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("elevateu=debug,info")),
        )
        .with(format)
        .init();
}
