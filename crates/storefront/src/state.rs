//! Application context shared with the UI layer.
//!
//! One [`App`] owns the whole client: configuration, persistence, the API
//! client, the session, the cart, and the selected location. UI layers hold
//! it by reference and go through its methods - there are no ambient
//! globals.

use thiserror::Error;

use crate::api::types::{Location, PaymentConfig};
use crate::api::{ApiClient, ApiError};
use crate::cart::CartStore;
use crate::checkout::{self, CheckoutError, CheckoutStep, DeliveryForm};
use crate::config::{ConfigError, StorefrontConfig};
use crate::session::Session;
use crate::storage::{LocalStore, StorageError, keys};

/// Errors that can occur building the application context.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The storefront application context.
pub struct App {
    config: StorefrontConfig,
    store: LocalStore,
    api: Option<ApiClient>,
    session: Option<Session>,
    cart: CartStore,
    location: Option<Location>,
    payments: Option<PaymentConfig>,
    payments_fetched: bool,
}

impl App {
    /// Build the context from configuration: open persistence, construct the
    /// API client (when a backend is configured), and reload the selected
    /// location and any local cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file is unreadable or the HTTP client
    /// cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let store = LocalStore::open(&config.state_path)?;

        let api = if config.has_backend() {
            let session_id = store.session_id()?;
            ApiClient::from_config(&config, Some(session_id))?
        } else {
            None
        };

        let session = api
            .clone()
            .map(|api| Session::new(api, store.clone()));
        let cart = CartStore::new(api.clone(), store.clone());
        let location = store.get(keys::LOCATION);

        Ok(Self {
            config,
            store,
            api,
            session,
            cart,
            location,
            payments: None,
            payments_fetched: false,
        })
    }

    /// Restore persisted state that needs the network: validate any stored
    /// token, then load the cart from its source of truth. Failures degrade
    /// (signed out, empty cart) rather than propagate.
    pub async fn bootstrap(&mut self) {
        if let Some(session) = &mut self.session {
            session.restore().await;
        }
        if let Err(e) = self.cart.refresh().await {
            tracing::warn!(error = %e, "cart refresh failed during bootstrap");
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// The backend API client, when a backend is configured.
    #[must_use]
    pub const fn api(&self) -> Option<&ApiClient> {
        self.api.as_ref()
    }

    /// The customer session, when a backend is configured.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Mutable access to the customer session.
    pub const fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// The cart store.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Mutable access to the cart store.
    pub const fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    /// The currently selected store location.
    #[must_use]
    pub const fn selected_location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Select a store location and persist the choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection cannot be persisted.
    pub fn select_location(&mut self, location: Location) -> Result<(), StorageError> {
        self.store.insert(keys::LOCATION, &location)?;
        self.location = Some(location);
        Ok(())
    }

    /// The card-payment provider configuration, fetched once and cached.
    ///
    /// `None` means no backend, the provider endpoint failed, or the
    /// publishable key is empty - in every case checkout skips the payment
    /// step.
    pub async fn payments(&mut self) -> Option<&PaymentConfig> {
        if !self.payments_fetched {
            self.payments_fetched = true;
            if let Some(api) = &self.api {
                match api.payment_config().await {
                    Ok(config) if config.is_available() => self.payments = Some(config),
                    Ok(_) => tracing::debug!("card payments not configured"),
                    Err(e) => tracing::debug!(error = %e, "payment config unavailable"),
                }
            }
        }
        self.payments.as_ref()
    }

    /// Run the checkout flow against the current cart and selected location.
    ///
    /// # Errors
    ///
    /// Returns an error if no backend is configured or any checkout gate
    /// fails; see [`checkout::submit`].
    pub async fn checkout(&mut self, form: &DeliveryForm) -> Result<CheckoutStep, CheckoutError> {
        let Some(api) = self.api.clone() else {
            return Err(CheckoutError::NotConfigured);
        };
        self.payments().await;

        let location = self.location.clone();
        checkout::submit(
            &api,
            &mut self.cart,
            location.as_ref(),
            self.payments.as_ref(),
            form,
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("stonefire-app-test-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_local_only_app_has_no_api_or_session() {
        let app = App::new(StorefrontConfig::local_only(temp_path())).unwrap();
        assert!(app.api().is_none());
        assert!(app.session().is_none());
        assert!(app.cart().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_without_backend_is_rejected() {
        let mut app = App::new(StorefrontConfig::local_only(temp_path())).unwrap();
        let result = app.checkout(&DeliveryForm::default()).await;
        assert!(matches!(result, Err(CheckoutError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_selected_location_persists() {
        let path = temp_path();
        let location: Location = serde_json::from_value(serde_json::json!({
            "id": 4,
            "store_name": "Riverside",
            "address": "9 Dough Ln",
            "city": "Springfield",
            "is_active": true
        }))
        .unwrap();

        {
            let mut app = App::new(StorefrontConfig::local_only(&path)).unwrap();
            app.select_location(location.clone()).unwrap();
        }
        let app = App::new(StorefrontConfig::local_only(&path)).unwrap();
        assert_eq!(
            app.selected_location().map(|l| l.store_name.as_str()),
            Some("Riverside")
        );
    }
}
