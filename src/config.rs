// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. With
//! `BACKEND_MODE=memory` the service runs against the in-process backend
//! and the hosted-backend credentials become optional.

use std::env;
use std::time::Duration;

/// Which backend implementation the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Hosted auth + data service over HTTP.
    Remote,
    /// In-process backend (local development, tests).
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Base URL of the hosted backend (e.g. `https://xyz.supabase.co`)
    pub backend_url: String,
    /// Public URL of this site, used for email verification redirects
    pub site_url: String,
    /// Server port
    pub port: u16,
    /// Per-request timeout for backend calls
    pub backend_timeout: Duration,
    pub backend_mode: BackendMode,

    // --- Secrets ---
    /// Public (anon) API key sent with auth requests
    pub backend_anon_key: String,
    /// Service key used for table access from the server
    pub backend_service_key: String,
    /// Secret the backend signs session JWTs with (raw bytes)
    pub jwt_secret: Vec<u8>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            backend_url: "http://localhost:54321".to_string(),
            site_url: "http://localhost:3000".to_string(),
            port: 8080,
            backend_timeout: Duration::from_secs(10),
            backend_mode: BackendMode::Memory,
            backend_anon_key: "test_anon_key".to_string(),
            backend_service_key: "test_service_key".to_string(),
            jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
        }
    }

    /// Whether session cookies get the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.site_url.starts_with("https://")
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend_mode = match env::var("BACKEND_MODE").as_deref() {
            Ok("memory") => BackendMode::Memory,
            Ok("remote") | Err(_) => BackendMode::Remote,
            Ok(other) => return Err(ConfigError::Invalid("BACKEND_MODE", other.to_string())),
        };

        // In memory mode the hosted-backend settings fall back to local values.
        let required = |name: &'static str, fallback: &str| -> Result<String, ConfigError> {
            match env::var(name) {
                Ok(v) => Ok(v.trim().to_string()),
                Err(_) if backend_mode == BackendMode::Memory => Ok(fallback.to_string()),
                Err(_) => Err(ConfigError::Missing(name)),
            }
        };

        let timeout_secs = match env::var("BACKEND_TIMEOUT_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("BACKEND_TIMEOUT_SECS", v))?,
            Err(_) => 10,
        };

        Ok(Self {
            backend_url: required("BACKEND_URL", "http://localhost:54321")?
                .trim_end_matches('/')
                .to_string(),
            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            backend_timeout: Duration::from_secs(timeout_secs),
            backend_mode,

            backend_anon_key: required("BACKEND_ANON_KEY", "local-anon-key")?,
            backend_service_key: required("BACKEND_SERVICE_KEY", "local-service-key")?,
            jwt_secret: required("BACKEND_JWT_SECRET", "local_dev_jwt_secret_32_bytes!!!")?
                .into_bytes(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases touch process-wide environment, so they run in one test.
    #[test]
    fn test_config_from_env() {
        env::set_var("BACKEND_MODE", "memory");
        env::remove_var("BACKEND_URL");
        env::set_var("BACKEND_TIMEOUT_SECS", "3");
        env::set_var("SITE_URL", "https://elevateu.example/");

        let config = Config::from_env().expect("Config should load in memory mode");
        assert_eq!(config.backend_mode, BackendMode::Memory);
        assert_eq!(config.backend_url, "http://localhost:54321");
        assert_eq!(config.site_url, "https://elevateu.example");
        assert_eq!(config.backend_timeout, Duration::from_secs(3));
        assert_eq!(config.port, 8080);
        assert!(config.secure_cookies());
        assert!(!Config::test_default().secure_cookies());

        env::set_var("BACKEND_MODE", "remote");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BACKEND_URL")));

        env::set_var("BACKEND_MODE", "bogus");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("BACKEND_MODE", _)));

        env::remove_var("BACKEND_MODE");
        env::remove_var("BACKEND_TIMEOUT_SECS");
        env::remove_var("SITE_URL");
    }
}
