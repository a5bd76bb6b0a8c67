//! Wire types for the ordering backend REST API.
//!
//! Request bodies serialize exactly what the backend expects (including its
//! camelCase checkout fields); response types are tolerant of optional
//! fields the backend omits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use stonefire_core::{CartItemId, CategoryId, LocationId, Price, ProductId, UserId};

// =============================================================================
// Auth
// =============================================================================

/// `POST /auth/signup` request body.
#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// `POST /auth/login` request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// The signed-in customer, from `GET /auth/me` or nested in a login
/// response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// `PATCH /auth/me` request body. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// `POST /auth/change-password` request body.
#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// Cart
// =============================================================================

/// `GET /cart` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteCart {
    #[serde(default)]
    pub items: Vec<RemoteCartItem>,
}

/// One backend cart line.
///
/// Catalog items carry a `menu_item` summary; fully custom pizzas carry only
/// `custom_data`. [`crate::cart`] folds both shapes into one [`crate::cart::CartLine`].
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCartItem {
    pub id: CartItemId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Option<Price>,
    #[serde(default)]
    pub custom_data: Option<Value>,
    #[serde(default)]
    pub menu_item: Option<MenuItemSummary>,
}

/// The `menu_item` summary nested in a cart line.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemSummary {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub image: Option<String>,
}

/// `POST /cart/add` request body.
#[derive(Debug, Serialize)]
pub struct CartAddRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Value>,
}

/// `PUT /cart/update` request body.
#[derive(Debug, Serialize)]
pub struct CartUpdateRequest {
    pub item_id: CartItemId,
    pub quantity: u32,
}

// =============================================================================
// Menu catalog
// =============================================================================

/// A menu category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A catalog product (pizza, side, drink).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub sauce: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub category_id: CategoryId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub base_price: Price,
}

/// A topping available in the customizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topping {
    pub id: stonefire_core::ToppingId,
    pub name: String,
    /// Topping group: `cheese`, `meat`, `veggie`, ...
    #[serde(rename = "type")]
    pub kind: String,
}

/// Filters for `GET /menu/products`.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub kind: Option<String>,
}

// =============================================================================
// Checkout & orders
// =============================================================================

/// `POST /orders/checkout` request body.
///
/// Field names follow the backend's checkout schema, which kept the web
/// form's camelCase for `zipCode` and `paymentMethod`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(rename = "zipCode")]
    pub zip_code: String,
    #[serde(rename = "paymentMethod")]
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSnapshot>,
}

/// The location snapshot sent with a checkout, so the backend can resolve
/// the order's store even when ids drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub store_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub opening_time: Option<String>,
    #[serde(default)]
    pub closing_time: Option<String>,
}

/// `POST /orders/checkout` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResponse {
    pub id: stonefire_core::OrderId,
    pub total: Price,
}

// =============================================================================
// Locations
// =============================================================================

/// A store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub store_name: String,
    pub address: String,
    #[serde(default)]
    pub area: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub opening_time: Option<String>,
    #[serde(default)]
    pub closing_time: Option<String>,
    /// Whether the owning store currently accepts orders. Inactive stores
    /// hard-block checkout.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl Location {
    /// The snapshot sent with checkout requests.
    #[must_use]
    pub fn snapshot(&self) -> LocationSnapshot {
        LocationSnapshot {
            store_name: self.store_name.clone(),
            address: Some(self.address.clone()),
            area: self.area.clone(),
            city: Some(self.city.clone()),
            state: self.state.clone(),
            pincode: self.pincode.clone(),
            phone: self.phone.clone(),
            opening_time: self.opening_time.clone(),
            closing_time: self.closing_time.clone(),
        }
    }
}

// =============================================================================
// Payments
// =============================================================================

/// `GET /payments/config` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    #[serde(default)]
    pub publishable_key: String,
}

impl PaymentConfig {
    /// Whether a card-payment provider is configured at all.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.publishable_key.trim().is_empty()
    }
}

/// `POST /payments/create-payment-intent` request body.
#[derive(Debug, Serialize)]
pub struct PaymentIntentRequest {
    pub order_id: stonefire_core::OrderId,
}

/// `POST /payments/create-payment-intent` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
    pub amount_cents: i64,
}
