//! Backend cart endpoints.
//!
//! These are the raw wire operations. [`crate::cart::CartStore`] layers the
//! write-then-refetch reconciliation on top.

use tracing::instrument;

use stonefire_core::CartItemId;

use super::types::{CartAddRequest, CartUpdateRequest, RemoteCart};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch the signed-in customer's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<RemoteCart, ApiError> {
        self.get_json("/cart").await
    }

    /// Add an item to the backend cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self, request))]
    pub async fn add_cart_item(&self, request: &CartAddRequest) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post_json("/cart/add", request).await?;
        Ok(())
    }

    /// Change the quantity of a backend cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the request fails.
    #[instrument(skip(self), fields(item_id = %request.item_id, quantity = request.quantity))]
    pub async fn update_cart_item(&self, request: &CartUpdateRequest) -> Result<(), ApiError> {
        let _: serde_json::Value = self.put_json("/cart/update", request).await?;
        Ok(())
    }

    /// Remove a backend cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        self.delete(&format!("/cart/remove/{item_id}")).await
    }

    /// Empty the backend cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        self.delete("/cart/clear").await
    }
}
