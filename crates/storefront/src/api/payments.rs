//! Card-payment provider endpoints.
//!
//! The backend fronts the provider; this client never sees a secret key.
//! Amounts are computed server-side from the order - the client only hands
//! over the order id and receives a client secret for the hosted form.

use tracing::instrument;

use stonefire_core::OrderId;

use super::types::{PaymentConfig, PaymentIntentRequest, PaymentIntentResponse};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch the provider's publishable key.
    ///
    /// An empty key means card payments are not configured and checkout
    /// should skip the payment-collection step.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn payment_config(&self) -> Result<PaymentConfig, ApiError> {
        self.get_json("/payments/config").await
    }

    /// Create (or re-fetch) a payment intent for an order.
    ///
    /// The backend returns the existing client secret when the order already
    /// has a pending intent, so calling this twice is safe.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist, is already paid, or the
    /// provider is unavailable.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn create_payment_intent(
        &self,
        order_id: OrderId,
    ) -> Result<PaymentIntentResponse, ApiError> {
        self.post_json(
            "/payments/create-payment-intent",
            &PaymentIntentRequest { order_id },
        )
        .await
    }
}
