//! Ordering backend API client.
//!
//! A thin typed layer over the backend's JSON REST endpoints. One
//! [`ApiClient`] is shared (cheaply cloned) by the cart store, the session,
//! the checkout orchestrator, and the order poller.
//!
//! # Conventions
//!
//! - Bearer token in the `Authorization` header once a session exists
//! - Anonymous `X-Session-Id` header on every request
//! - Non-2xx responses carry a JSON body with a `detail` field (string or
//!   list of `{msg}` objects) used for user-facing error text; a custom
//!   `X-Error-Type` header may name the form field a login error applies to
//! - Any 401 clears the in-memory token and fires the globally installed
//!   unauthorized hook exactly once per occurrence

mod auth;
mod cart;
mod locations;
mod menu;
pub mod normalize;
mod orders;
mod payments;
pub mod types;

use std::sync::{Arc, RwLock};

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::StorefrontConfig;

pub(crate) use menu::MenuCache;

/// Hook invoked whenever the backend answers 401.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Errors that can occur talking to the ordering backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the credentials or the token expired. Carries
    /// the `detail` text and field hint so login forms can show them; the
    /// global unauthorized hook has already fired by the time this is seen.
    #[error("unauthorized")]
    Unauthorized {
        /// User-facing message extracted from the `detail` payload.
        detail: Option<String>,
        /// Form field this error applies to, from the `X-Error-Type` header.
        field: Option<String>,
    },

    /// The backend answered with a non-2xx status and (usually) a `detail`
    /// payload.
    #[error("backend error ({status}): {}", detail.as_deref().unwrap_or("request failed"))]
    Backend {
        /// HTTP status code.
        status: u16,
        /// User-facing message extracted from the `detail` payload.
        detail: Option<String>,
        /// Form field this error applies to, from the `X-Error-Type` header.
        field: Option<String>,
    },

    /// The response body was not the JSON shape we expected.
    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// A message suitable for direct display.
    ///
    /// Network-level failures get a generic retry-prompting message rather
    /// than a `reqwest` debug string.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => {
                "The request timed out. Please try again.".to_string()
            }
            Self::Http(_) => "Network error. Please check your connection.".to_string(),
            Self::Unauthorized { detail, .. } => detail
                .clone()
                .unwrap_or_else(|| "Your session has expired. Please sign in again.".to_string()),
            Self::Backend { detail, .. } => detail
                .clone()
                .unwrap_or_else(|| "Request failed. Please try again.".to_string()),
            Self::Parse(_) => "The server sent an unexpected response.".to_string(),
        }
    }

    /// The form field a login error applies to, when the backend named one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Backend { field, .. } | Self::Unauthorized { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

/// Client for the ordering backend REST API.
///
/// Cheaply cloneable; clones share the token, the unauthorized hook, and the
/// menu cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    session_id: Option<String>,
    token: RwLock<Option<SecretString>>,
    on_unauthorized: RwLock<Option<UnauthorizedHook>>,
    menu_cache: MenuCache,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout: std::time::Duration,
        session_id: Option<String>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                session_id,
                token: RwLock::new(None),
                on_unauthorized: RwLock::new(None),
                menu_cache: MenuCache::new(),
            }),
        })
    }

    /// Create a client for the backend named in `config`.
    ///
    /// Returns `None` when no backend is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn from_config(
        config: &StorefrontConfig,
        session_id: Option<String>,
    ) -> Result<Option<Self>, ApiError> {
        let Some(base_url) = config.api_base.as_deref() else {
            return Ok(None);
        };
        Self::new(base_url, config.request_timeout, session_id).map(Some)
    }

    /// Set the bearer token used for authenticated requests.
    pub fn set_token(&self, token: SecretString) {
        *self.write_token() = Some(token);
    }

    /// Drop the bearer token.
    pub fn clear_token(&self) {
        *self.write_token() = None;
    }

    /// Whether a bearer token is currently set.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    /// Install the global unauthorized hook. Installed once at application
    /// start; a later call replaces the previous hook.
    pub fn set_on_unauthorized(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self
            .inner
            .on_unauthorized
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(Arc::new(hook));
    }

    fn write_token(&self) -> std::sync::RwLockWriteGuard<'_, Option<SecretString>> {
        self.inner
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Clear the token and fire the unauthorized hook. Called on every 401.
    fn handle_unauthorized(&self) {
        self.clear_token();
        let hook = self
            .inner
            .on_unauthorized
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Execute a request and return the response body as JSON.
    ///
    /// 204 and empty bodies come back as `Value::Null`.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut request = self.inner.http.request(method, &url);

        if let Some(session_id) = &self.inner.session_id {
            request = request.header("X-Session-Id", session_id);
        }
        {
            let token = self
                .inner
                .token
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(token) = token.as_ref() {
                request = request.bearer_auth(token.expose_secret());
            }
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let field = response
                .headers()
                .get("x-error-type")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let body_text = response.text().await.unwrap_or_default();
            let detail = parse_detail(&body_text);
            tracing::debug!(%url, status = status.as_u16(), ?detail, "backend error");

            if status == StatusCode::UNAUTHORIZED {
                self.handle_unauthorized();
                return Err(ApiError::Unauthorized { detail, field });
            }
            return Err(ApiError::Backend {
                status: status.as_u16(),
                detail,
                field,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Typed GET escape hatch; prefer the endpoint methods where one exists.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.send(Method::GET, path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Raw GET for endpoints whose shape needs normalizing first.
    pub async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::GET, path, None).await
    }

    /// Typed POST escape hatch.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self
            .send(Method::POST, path, Some(serde_json::to_value(body)?))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Typed PUT escape hatch.
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self
            .send(Method::PUT, path, Some(serde_json::to_value(body)?))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Typed PATCH escape hatch.
    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = self
            .send(Method::PATCH, path, Some(serde_json::to_value(body)?))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// DELETE, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    pub(crate) fn menu_cache(&self) -> &MenuCache {
        &self.inner.menu_cache
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Extract the user-facing message from an error body.
///
/// The backend's `detail` is either a plain string or a list of validation
/// objects; list entries contribute their `msg` field (or their JSON form)
/// joined with commas. Anything else yields `None`.
fn parse_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(entries) => {
            let parts: Vec<String> = entries
                .iter()
                .map(|entry| match entry.get("msg").and_then(Value::as_str) {
                    Some(msg) => msg.to_string(),
                    None => entry.to_string(),
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detail_string() {
        assert_eq!(
            parse_detail(r#"{"detail": "Cart is empty"}"#).as_deref(),
            Some("Cart is empty")
        );
    }

    #[test]
    fn test_parse_detail_validation_list() {
        let body = r#"{"detail": [{"msg": "Name is required"}, {"msg": "Invalid email"}]}"#;
        assert_eq!(
            parse_detail(body).as_deref(),
            Some("Name is required, Invalid email")
        );
    }

    #[test]
    fn test_parse_detail_list_without_msg_falls_back_to_json() {
        let body = r#"{"detail": [{"loc": ["body", "email"]}]}"#;
        assert_eq!(
            parse_detail(body).as_deref(),
            Some(r#"{"loc":["body","email"]}"#)
        );
    }

    #[test]
    fn test_parse_detail_absent() {
        assert_eq!(parse_detail(r#"{"error": "nope"}"#), None);
        assert_eq!(parse_detail("not json"), None);
        assert_eq!(parse_detail(r#"{"detail": 42}"#), None);
    }

    #[test]
    fn test_user_message_for_backend_error() {
        let err = ApiError::Backend {
            status: 400,
            detail: Some("Store not found".to_string()),
            field: None,
        };
        assert_eq!(err.user_message(), "Store not found");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_field_hint_on_login_rejection() {
        let err = ApiError::Unauthorized {
            detail: Some("Invalid email or password".to_string()),
            field: Some("password".to_string()),
        };
        assert_eq!(err.field(), Some("password"));
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[test]
    fn test_expired_session_message() {
        let err = ApiError::Unauthorized {
            detail: None,
            field: None,
        };
        assert_eq!(
            err.user_message(),
            "Your session has expired. Please sign in again."
        );
    }
}
