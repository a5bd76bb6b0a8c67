//! Checkout orchestration: validate, create the order, hand off to payment.
//!
//! The flow is one-directional. `submit` either fails (nothing created), or
//! produces a [`CheckoutStep`]: straight to confirmation for cash (or when
//! no card provider is configured), or a payment-collection step whose
//! `succeeded` transition yields the confirmation. A payment-intent failure
//! does not lose the order - it confirms with the error flagged for display.

use std::collections::BTreeMap;

use thiserror::Error;

use stonefire_core::{Email, OrderId, PaymentMethod, Price};

use crate::api::types::{CheckoutRequest, Location, PaymentConfig};
use crate::api::{ApiClient, ApiError};
use crate::cart::{CartError, CartStore};

/// Delivery form filled in by the customer.
#[derive(Debug, Clone, Default)]
pub struct DeliveryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub payment_method: PaymentMethod,
}

/// Field-scoped validation errors, keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message for one field, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// All `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self
            .errors
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect();
        write!(f, "{}", joined.join(", "))
    }
}

/// Errors that block checkout before an order exists.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Orders can only be created against a configured backend.
    #[error("no backend configured")]
    NotConfigured,

    /// One or more form fields are invalid.
    #[error("invalid delivery form: {0}")]
    Validation(ValidationErrors),

    /// No store location has been selected.
    #[error("select a store location before checking out")]
    NoLocationSelected,

    /// The selected store is not accepting orders.
    #[error("{0} is currently closed and not accepting orders")]
    StoreInactive(String),

    /// There is nothing in the cart.
    #[error("the cart is empty")]
    EmptyCart,

    /// Order creation failed on the backend.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The cart could not be read.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Where the flow landed after a successful submit.
#[derive(Debug)]
pub enum CheckoutStep {
    /// Card flow: collect payment through the hosted form, then call
    /// [`PaymentSession::succeeded`].
    Payment(PaymentSession),
    /// Terminal confirmation view data.
    Confirmed(Confirmation),
}

/// An order awaiting payment collection in the hosted form.
#[derive(Debug)]
pub struct PaymentSession {
    pub order_id: OrderId,
    pub total: Price,
    /// Client secret the hosted payment form is initialized with.
    pub client_secret: String,
    /// Provider publishable key for the embedding layer.
    pub publishable_key: String,
}

impl PaymentSession {
    /// The hosted form reported success; move to confirmation.
    #[must_use]
    pub fn succeeded(self) -> Confirmation {
        Confirmation {
            order_id: self.order_id,
            total: self.total,
            payment_error: None,
        }
    }
}

/// Confirmation view data. `payment_error` is set when the order exists but
/// the payment step could not be started.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub order_id: OrderId,
    pub total: Price,
    pub payment_error: Option<String>,
}

/// Validate the delivery form. Field-scoped; all failures reported at once.
#[must_use]
pub fn validate(form: &DeliveryForm) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if form.name.trim().is_empty() {
        errors.push("name", "Name is required");
    }
    if form.email.trim().is_empty() {
        errors.push("email", "Email is required");
    } else if Email::parse(&form.email).is_err() {
        errors.push("email", "Email is invalid");
    }
    if form.phone.trim().is_empty() {
        errors.push("phone", "Phone is required");
    }
    if form.address.trim().is_empty() {
        errors.push("address", "Address is required");
    }
    if form.city.trim().is_empty() {
        errors.push("city", "City is required");
    }
    if form.zip_code.trim().is_empty() {
        errors.push("zip_code", "Zip code is required");
    }

    errors
}

/// Run the checkout flow.
///
/// Gate order: the selected location is checked first (an inactive store is
/// a hard block regardless of form validity), then the form fields, then the
/// cart. On success the cart is cleared; a failed clear is logged but does
/// not undo the order.
///
/// # Errors
///
/// Returns an error if any gate fails or order creation fails. No order
/// exists unless `Ok` is returned.
pub async fn submit(
    api: &ApiClient,
    cart: &mut CartStore,
    location: Option<&Location>,
    payments: Option<&PaymentConfig>,
    form: &DeliveryForm,
) -> Result<CheckoutStep, CheckoutError> {
    let location = location.ok_or(CheckoutError::NoLocationSelected)?;
    if !location.is_active {
        return Err(CheckoutError::StoreInactive(location.store_name.clone()));
    }

    let errors = validate(form);
    if !errors.is_empty() {
        return Err(CheckoutError::Validation(errors));
    }

    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let method = form.payment_method;
    let request = CheckoutRequest {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        address: form.address.trim().to_string(),
        city: form.city.trim().to_string(),
        zip_code: form.zip_code.trim().to_string(),
        payment_method: match method {
            PaymentMethod::Card => "card".to_string(),
            PaymentMethod::Cash => "cash".to_string(),
        },
        location: Some(location.snapshot()),
    };

    let order = api.checkout(&request).await?;
    tracing::info!(order_id = %order.id, total = %order.total, "order created");

    if let Err(e) = cart.clear().await {
        tracing::warn!(error = %e, "failed to clear cart after checkout");
    }

    let card_available = payments.is_some_and(PaymentConfig::is_available);
    if method == PaymentMethod::Card && card_available {
        match api.create_payment_intent(order.id).await {
            Ok(intent) => {
                return Ok(CheckoutStep::Payment(PaymentSession {
                    order_id: order.id,
                    total: order.total,
                    client_secret: intent.client_secret,
                    publishable_key: payments
                        .map(|p| p.publishable_key.clone())
                        .unwrap_or_default(),
                }));
            }
            Err(e) => {
                // The order exists; confirm it with the payment error flagged.
                tracing::warn!(order_id = %order.id, error = %e, "payment intent failed");
                return Ok(CheckoutStep::Confirmed(Confirmation {
                    order_id: order.id,
                    total: order.total,
                    payment_error: Some(e.user_message()),
                }));
            }
        }
    }

    Ok(CheckoutStep::Confirmed(Confirmation {
        order_id: order.id,
        total: order.total,
        payment_error: None,
    }))
}
