//! Authentication endpoints.

use tracing::instrument;

use super::types::{
    ChangePasswordRequest, LoginRequest, MessageResponse, ProfileUpdate, SignupRequest,
    TokenResponse, UserProfile,
};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered or the request
    /// fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ApiError> {
        self.post_json("/auth/signup", request).await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// The token is NOT set on the client here; [`crate::session::Session`]
    /// owns that decision so persistence stays in one place.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` on bad credentials, with any
    /// field hint available via [`ApiError::field`].
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, ApiError> {
        self.post_json("/auth/login", request).await
    }

    /// Fetch the signed-in customer's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is missing or stale.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/auth/me").await
    }

    /// Update name and/or phone on the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.patch_json("/auth/me", update).await
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Returns an error if the current password is wrong or the request
    /// fails.
    #[instrument(skip(self, request))]
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post_json("/auth/change-password", request).await
    }
}
