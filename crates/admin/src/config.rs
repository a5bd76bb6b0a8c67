//! Admin client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STONEFIRE_API_URL` - Base URL of the ordering backend
//!
//! ## Optional
//! - `STONEFIRE_ADMIN_STATE_PATH` - Path of the admin state file (default:
//!   `.stonefire/admin-state.json`)
//! - `STONEFIRE_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATE_PATH: &str = ".stonefire/admin-state.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum AdminConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin client configuration.
///
/// Unlike the storefront, the admin client is useless without a backend, so
/// the API URL is required.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the ordering backend.
    pub api_base: String,
    /// Path of the admin state file (token, role, store id).
    pub state_path: PathBuf,
    /// Timeout applied to every backend request.
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `STONEFIRE_API_URL` is missing or invalid, or the
    /// timeout is not a positive integer.
    pub fn from_env() -> Result<Self, AdminConfigError> {
        let _ = dotenvy::dotenv();

        let raw = std::env::var("STONEFIRE_API_URL")
            .map_err(|_| AdminConfigError::MissingEnvVar("STONEFIRE_API_URL".to_string()))?;
        let api_base = validate_base_url(&raw)?;

        let state_path = std::env::var("STONEFIRE_ADMIN_STATE_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH), PathBuf::from);

        let timeout_secs = match std::env::var("STONEFIRE_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                AdminConfigError::InvalidEnvVar(
                    "STONEFIRE_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base,
            state_path,
            request_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    /// A configuration pointing at the given backend URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_base` is not a valid URL.
    pub fn new(api_base: &str, state_path: impl Into<PathBuf>) -> Result<Self, AdminConfigError> {
        Ok(Self {
            api_base: validate_base_url(api_base)?,
            state_path: state_path.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sentry_dsn: None,
        })
    }
}

fn validate_base_url(raw: &str) -> Result<String, AdminConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        AdminConfigError::InvalidEnvVar("STONEFIRE_API_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AdminConfigError::InvalidEnvVar(
            "STONEFIRE_API_URL".to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}
