//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STONEFIRE_API_URL` - Base URL of the ordering backend. When unset, the
//!   client runs without a backend: the cart is purely local and
//!   authentication is unavailable.
//! - `STONEFIRE_STATE_PATH` - Path of the local state file (default:
//!   `.stonefire/state.json`)
//! - `STONEFIRE_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default request timeout. An idle request must fail fast rather than hang.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default location of the persisted client state file.
const DEFAULT_STATE_PATH: &str = ".stonefire/state.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the ordering backend. `None` means no backend is
    /// configured and the cart runs locally.
    pub api_base: Option<String>,
    /// Path of the local state file (token, cart, selected location).
    pub state_path: PathBuf,
    /// Timeout applied to every backend request.
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `STONEFIRE_API_URL` is present but not a
    /// valid URL, or `STONEFIRE_TIMEOUT_SECS` is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base = match std::env::var("STONEFIRE_API_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(validate_base_url(&raw)?),
            _ => None,
        };

        let state_path = std::env::var("STONEFIRE_STATE_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH), PathBuf::from);

        let timeout_secs = match std::env::var("STONEFIRE_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("STONEFIRE_TIMEOUT_SECS".to_string(), e.to_string())
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

    /// A configuration with no backend: local cart, no authentication.
    #[must_use]
    pub fn local_only(state_path: impl Into<PathBuf>) -> Self {
        Self {
            api_base: None,
            state_path: state_path.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sentry_dsn: None,
        }
    }

    /// A configuration pointing at the given backend URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base` is not a valid URL.
    pub fn with_backend(
        api_base: &str,
        state_path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: Some(validate_base_url(api_base)?),
            state_path: state_path.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sentry_dsn: None,
        })
    }

    /// Whether a backend is configured.
    #[must_use]
    pub const fn has_backend(&self) -> bool {
        self.api_base.is_some()
    }
}

/// Validate a backend base URL and strip any trailing slash so paths can be
/// appended verbatim.
fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("STONEFIRE_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "STONEFIRE_API_URL".to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    Ok(raw.trim().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url_strips_trailing_slash() {
        assert_eq!(
            validate_base_url("http://localhost:8000/").unwrap(),
            "http://localhost:8000"
        );
    }

    #[test]
    fn test_validate_base_url_rejects_garbage() {
        assert!(validate_base_url("not a url").is_err());
        assert!(validate_base_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_local_only_has_no_backend() {
        let config = StorefrontConfig::local_only("/tmp/state.json");
        assert!(!config.has_backend());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_with_backend() {
        let config =
            StorefrontConfig::with_backend("https://api.example.com/", "/tmp/s.json").unwrap();
        assert_eq!(config.api_base.as_deref(), Some("https://api.example.com"));
        assert!(config.has_backend());
    }
}
