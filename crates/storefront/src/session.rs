//! Customer authentication session.
//!
//! Owns the bearer token lifecycle: login/signup/logout, persistence under a
//! fixed key, and silent restoration at startup. The global 401 behavior
//! lives on the [`ApiClient`] hook; [`Session::install_sign_out_hook`] wires
//! it so any unauthorized response anywhere clears the persisted token and
//! notifies the UI layer.

use secrecy::SecretString;
use thiserror::Error;

use stonefire_core::{Email, EmailError};

use crate::api::types::{
    ChangePasswordRequest, LoginRequest, ProfileUpdate, SignupRequest, TokenResponse, UserProfile,
};
use crate::api::{ApiClient, ApiError};
use crate::storage::{LocalStore, StorageError, keys};

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No backend is configured; authentication is unavailable.
    #[error("no backend configured")]
    NotConfigured,

    /// The email failed the client-side structure check.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The backend accepted the login but returned no token.
    #[error("login response carried no access token")]
    MissingToken,

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisting or clearing the token failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The customer session: token state plus the signed-in profile.
pub struct Session {
    api: ApiClient,
    store: LocalStore,
    user: Option<UserProfile>,
}

impl Session {
    /// Create a session bound to the given client and persistence.
    #[must_use]
    pub const fn new(api: ApiClient, store: LocalStore) -> Self {
        Self {
            api,
            store,
            user: None,
        }
    }

    /// The signed-in customer, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Whether a token is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.api.has_token()
    }

    /// Install the global sign-out hook, called on any 401 from any request.
    ///
    /// The hook clears the persisted token (the in-memory token is already
    /// cleared by the client) and then runs `on_signed_out` - typically a
    /// redirect to the sign-in view. Install once at application start.
    pub fn install_sign_out_hook(&self, on_signed_out: impl Fn() + Send + Sync + 'static) {
        let store = self.store.clone();
        self.api.set_on_unauthorized(move || {
            if let Err(e) = store.remove(keys::TOKEN) {
                tracing::warn!(error = %e, "failed to clear persisted token");
            }
            on_signed_out();
        });
    }

    /// Restore a previous session at startup.
    ///
    /// If a token is persisted, set it on the client and validate it by
    /// fetching the profile. A stale token is discarded silently; the
    /// session degrades to signed-out rather than surfacing an error.
    pub async fn restore(&mut self) {
        let Some(token) = self.store.get::<String>(keys::TOKEN) else {
            return;
        };
        self.api.set_token(SecretString::from(token));

        match self.api.me().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "session restored");
                self.user = Some(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "discarding stale session token");
                self.api.clear_token();
                if let Err(e) = self.store.remove(keys::TOKEN) {
                    tracing::warn!(error = %e, "failed to clear stale token");
                }
                self.user = None;
            }
        }
    }

    /// Exchange credentials for a token and persist it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` with a field hint on bad credentials, or
    /// `AuthError::MissingToken` if the backend answers without a token.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let email = Email::parse(email)?;
        let response: TokenResponse = self
            .api
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        if response.access_token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        self.store.insert(keys::TOKEN, &response.access_token)?;
        self.api
            .set_token(SecretString::from(response.access_token));

        let user = match response.user {
            Some(user) => user,
            // Tolerate token-only responses by fetching the profile.
            None => self.api.me().await?,
        };
        self.user = Some(user.clone());
        Ok(user)
    }

    /// Create an account. The customer still logs in afterwards; the backend
    /// does not auto-issue a token on signup.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or already registered.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        self.api
            .signup(&SignupRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                phone: phone.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Sign out: drop the token everywhere and forget the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted token cannot be removed.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.api.clear_token();
        self.user = None;
        self.store.remove(keys::TOKEN)?;
        Ok(())
    }

    /// Update name and/or phone on the signed-in profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<UserProfile, AuthError> {
        let user = self.api.update_profile(update).await?;
        self.user = Some(user.clone());
        Ok(user)
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Returns an error if the current password is wrong.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.api
            .change_password(&ChangePasswordRequest {
                current_password: current_password.to_string(),
                new_password: new_password.to_string(),
            })
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("user", &self.user.as_ref().map(|u| u.id))
            .finish_non_exhaustive()
    }
}
