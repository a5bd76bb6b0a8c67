//! Admin API client and session.
//!
//! Admin auth is namespaced away from the customer session: its own state
//! file key, its own token, its own sign-out hook. The backend scopes order
//! queries to the admin's store; super admins can pass an explicit store id.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stonefire_core::{AdminRole, OrderId, OrderStatus, StoreId};
use stonefire_storefront::api::normalize::{OrderSummary, orders_from_value};
use stonefire_storefront::api::{ApiClient, ApiError};
use stonefire_storefront::storage::{LocalStore, StorageError, keys};

use crate::config::AdminConfig;
use crate::types::{
    AdminAuthResponse, AdminLoginRequest, AdminProfile, AdminSignupRequest, StatusUpdateRequest,
    StoreDescriptor, StoreInfo, StoreStatusRequest,
};

/// Errors that can occur in the admin client.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The backend accepted the login but returned no token.
    #[error("login response carried no access token")]
    MissingToken,

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisting or clearing the admin auth failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Who is signed in, and to which store.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub name: Option<String>,
    pub role: Option<AdminRole>,
    pub store_id: Option<StoreId>,
}

/// Admin auth as persisted in the state file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredAdminAuth {
    token: String,
    #[serde(default)]
    role: Option<AdminRole>,
    #[serde(default)]
    store_id: Option<StoreId>,
}

/// Client for the admin surface of the ordering backend.
pub struct AdminClient {
    api: ApiClient,
    store: LocalStore,
    identity: Option<AdminIdentity>,
}

impl AdminClient {
    /// Build the client: open the admin state file and construct the HTTP
    /// client.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file is unreadable or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &AdminConfig) -> Result<Self, AdminError> {
        let store = LocalStore::open(&config.state_path)?;
        let api = ApiClient::new(&config.api_base, config.request_timeout, None)?;
        Ok(Self {
            api,
            store,
            identity: None,
        })
    }

    /// The underlying API client (for pollers that outlive a borrow).
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The signed-in admin, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&AdminIdentity> {
        self.identity.as_ref()
    }

    /// The signed-in admin's store id, if known.
    #[must_use]
    pub fn store_id(&self) -> Option<StoreId> {
        self.identity.as_ref().and_then(|identity| identity.store_id)
    }

    /// Whether an admin token is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.api.has_token()
    }

    /// Install the global sign-out hook, called on any 401 from any admin
    /// request. Clears the persisted admin auth, then runs `on_signed_out`.
    pub fn install_sign_out_hook(&self, on_signed_out: impl Fn() + Send + Sync + 'static) {
        let store = self.store.clone();
        self.api.set_on_unauthorized(move || {
            if let Err(e) = store.remove(keys::ADMIN_AUTH) {
                tracing::warn!(error = %e, "failed to clear persisted admin auth");
            }
            on_signed_out();
        });
    }

    /// Restore a previous admin session at startup, validating the stored
    /// token against `/admin/me`. A stale token is discarded silently.
    pub async fn restore(&mut self) {
        let Some(auth) = self.store.get::<StoredAdminAuth>(keys::ADMIN_AUTH) else {
            return;
        };
        self.api.set_token(SecretString::from(auth.token));

        match self.api.get_json::<AdminProfile>("/admin/me").await {
            Ok(profile) => {
                self.identity = Some(AdminIdentity {
                    name: profile.name,
                    role: auth.role,
                    store_id: auth.store_id.or(profile.store.map(|s| s.id)),
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "discarding stale admin token");
                self.api.clear_token();
                if let Err(e) = self.store.remove(keys::ADMIN_AUTH) {
                    tracing::warn!(error = %e, "failed to clear stale admin auth");
                }
                self.identity = None;
            }
        }
    }

    /// Sign in. On bad credentials the error's field hint (from
    /// `X-Error-Type`) names whether email or password was rejected.
    ///
    /// # Errors
    ///
    /// Returns an error on bad credentials or request failure.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        store: Option<StoreDescriptor>,
    ) -> Result<AdminIdentity, AdminError> {
        let response: AdminAuthResponse = self
            .api
            .post_json(
                "/admin/login",
                &AdminLoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                    store,
                },
            )
            .await?;
        self.accept_auth(response)
    }

    /// Create a store together with its first admin, signed in on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken or the request fails.
    pub async fn signup(&mut self, request: &AdminSignupRequest) -> Result<AdminIdentity, AdminError> {
        let response: AdminAuthResponse = self.api.post_json("/admin/signup", request).await?;
        self.accept_auth(response)
    }

    /// Sign out: drop the token and forget the identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted auth cannot be removed.
    pub fn logout(&mut self) -> Result<(), AdminError> {
        self.api.clear_token();
        self.identity = None;
        self.store.remove(keys::ADMIN_AUTH)?;
        Ok(())
    }

    /// Fetch the signed-in admin's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is missing or stale.
    pub async fn me(&self) -> Result<AdminProfile, AdminError> {
        Ok(self.api.get_json("/admin/me").await?)
    }

    /// Fetch the store's orders, normalized from whatever shape the backend
    /// answers with. Pass a store id to scope explicitly (super admins);
    /// otherwise the backend scopes to the token's store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn orders(&self, store_id: Option<StoreId>) -> Result<Vec<OrderSummary>, AdminError> {
        let value = self.api.get_value(&orders_path(store_id)).await?;
        Ok(orders_from_value(&value))
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is invalid (terminal orders cannot
    /// change) or the request fails.
    pub async fn set_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), AdminError> {
        let _: serde_json::Value = self
            .api
            .patch_json(
                &format!("/admin/orders/{order_id}"),
                &StatusUpdateRequest { status },
            )
            .await?;
        Ok(())
    }

    /// Fetch the admin's store.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin has no store or the request fails.
    pub async fn store(&self) -> Result<StoreInfo, AdminError> {
        Ok(self.api.get_json("/admin/store").await?)
    }

    /// Toggle whether the store accepts orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn set_store_active(&self, is_active: bool) -> Result<(), AdminError> {
        let _: serde_json::Value = self
            .api
            .patch_json("/admin/store", &StoreStatusRequest { is_active })
            .await?;
        Ok(())
    }

    /// Fetch backend-computed dashboard metrics, passed through untyped
    /// because deployments disagree on the exact set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn stats(&self) -> Result<serde_json::Value, AdminError> {
        Ok(self.api.get_value("/admin/stats").await?)
    }

    fn accept_auth(&mut self, response: AdminAuthResponse) -> Result<AdminIdentity, AdminError> {
        if response.access_token.trim().is_empty() {
            return Err(AdminError::MissingToken);
        }

        self.store.insert(
            keys::ADMIN_AUTH,
            &StoredAdminAuth {
                token: response.access_token.clone(),
                role: response.role,
                store_id: response.store_id,
            },
        )?;
        self.api.set_token(SecretString::from(response.access_token));

        let identity = AdminIdentity {
            name: response.admin_name,
            role: response.role,
            store_id: response.store_id,
        };
        self.identity = Some(identity.clone());
        Ok(identity)
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("authenticated", &self.is_authenticated())
            .field("store_id", &self.store_id())
            .finish_non_exhaustive()
    }
}

/// Path for the admin order list, optionally scoped to a store.
pub(crate) fn orders_path(store_id: Option<StoreId>) -> String {
    match store_id {
        Some(store_id) => {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("store_id", &store_id.to_string())
                .finish();
            format!("/admin/orders?{encoded}")
        }
        None => "/admin/orders".to_string(),
    }
}
