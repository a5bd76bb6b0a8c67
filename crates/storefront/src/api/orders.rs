//! Customer order endpoints.

use tracing::instrument;

use stonefire_core::OrderId;

use super::normalize::{OrderSummary, orders_from_value};
use super::types::{CheckoutRequest, CheckoutResponse};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Create an order from the current backend cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, the store cannot be resolved,
    /// or the request fails.
    #[instrument(skip(self, request), fields(payment_method = %request.payment_method))]
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutResponse, ApiError> {
        self.post_json("/orders/checkout", request).await
    }

    /// Fetch the signed-in customer's orders, normalized from whatever
    /// shape the backend answers with.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
        let value = self.get_value("/orders").await?;
        Ok(orders_from_value(&value))
    }

    /// Fetch a single order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order(&self, order_id: OrderId) -> Result<OrderSummary, ApiError> {
        self.get_json(&format!("/orders/{order_id}")).await
    }
}
