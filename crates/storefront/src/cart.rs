//! Cart state, local or backend-backed.
//!
//! With a backend configured the server cart is the single source of truth:
//! every write is followed by a full refetch, so a failed write never leaves
//! the store partially mutated. Without a backend the cart lives entirely in
//! local state and is persisted after every mutation.
//!
//! Two lines are the same item when they share an id AND the same
//! customizations; the customization half of the identity is the canonical
//! serialized form from [`Customizations::fingerprint`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use stonefire_core::{CartItemId, Price, ProductId};

use crate::api::types::{CartAddRequest, CartUpdateRequest, RemoteCartItem};
use crate::api::{ApiClient, ApiError};
use crate::pricing::Customizations;
use crate::storage::{LocalStore, StorageError, keys};

/// Fallback display name for fully custom items.
const CUSTOM_ITEM_NAME: &str = "Custom Pizza";

/// Errors that can occur mutating the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The backend cart requires a signed-in session.
    #[error("sign in to use the cart")]
    AuthRequired,

    /// A backend cart operation failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persisting the local cart failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The line has no backend id, so it cannot be updated remotely.
    #[error("cart line {0} has no backend id")]
    NotRemoteLine(String),
}

/// One line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Line identity: the catalog item's handle locally, or the backend
    /// cart-item id as text when the backend owns the cart.
    pub id: String,
    /// Catalog reference, when the line is a catalog product.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub customizations: Customizations,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartLine {
    /// Line total (unit price times quantity).
    #[must_use]
    pub fn total(&self) -> Price {
        self.unit_price * self.quantity
    }

    fn matches(&self, id: &str, fingerprint: &str) -> bool {
        self.id == id && self.customizations.fingerprint() == fingerprint
    }
}

/// The cart, owned by the application context and mutated only through its
/// methods.
pub struct CartStore {
    backend: Option<ApiClient>,
    store: LocalStore,
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Create the cart store. With `backend: None` the cart is local and
    /// previously persisted lines are loaded immediately; otherwise the cart
    /// stays empty until [`CartStore::refresh`] runs with a session.
    #[must_use]
    pub fn new(backend: Option<ApiClient>, store: LocalStore) -> Self {
        let lines = if backend.is_none() {
            store.get::<Vec<CartLine>>(keys::CART).unwrap_or_default()
        } else {
            Vec::new()
        };
        Self {
            backend,
            store,
            lines,
        }
    }

    /// Whether the backend owns the cart.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.backend.is_some()
    }

    /// Current cart lines.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Total price across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Add an item.
    ///
    /// Remote: requires a session (otherwise [`CartError::AuthRequired`] and
    /// nothing changes), POSTs the item, then refetches the canonical cart.
    /// Local: merges into an existing line with the same identity, or
    /// appends.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing, the backend call fails,
    /// or the local cart cannot be persisted.
    pub async fn add(&mut self, line: CartLine) -> Result<(), CartError> {
        if let Some(api) = &self.backend {
            if !api.has_token() {
                return Err(CartError::AuthRequired);
            }
            let request = add_request(&line);
            api.add_cart_item(&request).await?;
            return self.refresh().await;
        }

        let quantity = line.quantity.max(1);
        let fingerprint = line.customizations.fingerprint();
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|existing| existing.matches(&line.id, &fingerprint))
        {
            existing.quantity += quantity;
        } else {
            self.lines.push(CartLine { quantity, ..line });
        }
        self.persist()
    }

    /// Remove the line matching `(id, customizations)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or the local cart cannot
    /// be persisted.
    pub async fn remove(
        &mut self,
        id: &str,
        customizations: &Customizations,
    ) -> Result<(), CartError> {
        if let Some(api) = &self.backend {
            let item_id = remote_id(id)?;
            api.remove_cart_item(item_id).await?;
            return self.refresh().await;
        }

        let fingerprint = customizations.fingerprint();
        self.lines.retain(|line| !line.matches(id, &fingerprint));
        self.persist()
    }

    /// Set a line's quantity. Zero removes the line entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or the local cart cannot
    /// be persisted.
    pub async fn set_quantity(
        &mut self,
        id: &str,
        customizations: &Customizations,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(id, customizations).await;
        }

        if let Some(api) = &self.backend {
            let request = CartUpdateRequest {
                item_id: remote_id(id)?,
                quantity,
            };
            api.update_cart_item(&request).await?;
            return self.refresh().await;
        }

        let fingerprint = customizations.fingerprint();
        for line in &mut self.lines {
            if line.matches(id, &fingerprint) {
                line.quantity = quantity;
            }
        }
        self.persist()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or the local cart cannot
    /// be persisted.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        if let Some(api) = &self.backend {
            api.clear_cart().await?;
            return self.refresh().await;
        }

        self.lines.clear();
        self.persist()
    }

    /// Reload the cart from its source of truth.
    ///
    /// Remote without a session yields an empty cart (the backend cart is
    /// per-user). Local reloads the persisted lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn refresh(&mut self) -> Result<(), CartError> {
        if let Some(api) = &self.backend {
            if !api.has_token() {
                self.lines.clear();
                return Ok(());
            }
            let remote = api.fetch_cart().await?;
            self.lines = remote.items.into_iter().map(line_from_remote).collect();
            return Ok(());
        }

        self.lines = self
            .store
            .get::<Vec<CartLine>>(keys::CART)
            .unwrap_or_default();
        Ok(())
    }

    fn persist(&self) -> Result<(), CartError> {
        self.store.insert(keys::CART, &self.lines)?;
        Ok(())
    }
}

/// Parse a line id back into the backend's cart-item id.
fn remote_id(id: &str) -> Result<CartItemId, CartError> {
    id.parse::<i64>()
        .map(CartItemId::new)
        .map_err(|_| CartError::NotRemoteLine(id.to_string()))
}

/// Build the `POST /cart/add` body for a line.
///
/// Catalog items send their product id and carry customizations (plus the
/// display image) in `custom_data`; fully custom items additionally embed
/// their name and price there because the backend has nothing to look up.
fn add_request(line: &CartLine) -> CartAddRequest {
    let mut custom_data = match serde_json::to_value(&line.customizations) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    if let Some(image) = &line.image {
        custom_data.insert("image".to_string(), Value::String(image.clone()));
    }
    if line.product_id.is_none() {
        custom_data.insert("name".to_string(), Value::String(line.name.clone()));
        if let Ok(price) = serde_json::to_value(line.unit_price) {
            custom_data.insert("price".to_string(), price);
        }
    }

    CartAddRequest {
        product_id: line.product_id,
        quantity: line.quantity.max(1),
        custom_data: Some(Value::Object(custom_data)),
    }
}

/// Fold a backend cart item into a [`CartLine`].
///
/// Name, price, and image each fall through a priority chain because the
/// backend reports catalog items and custom items differently.
fn line_from_remote(item: RemoteCartItem) -> CartLine {
    let menu_item = item.menu_item.as_ref();
    let custom = item.custom_data.unwrap_or(Value::Null);

    let name = menu_item
        .and_then(|m| m.name.clone())
        .or_else(|| {
            custom
                .get("name")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .or(item.product_name)
        .unwrap_or_else(|| CUSTOM_ITEM_NAME.to_string());

    let unit_price = menu_item
        .and_then(|m| m.price)
        .or(item.unit_price)
        .or_else(|| {
            custom
                .get("price")
                .and_then(|p| serde_json::from_value(p.clone()).ok())
        })
        .unwrap_or(Price::ZERO);

    let image = menu_item.and_then(|m| m.image.clone()).or_else(|| {
        custom
            .get("image")
            .and_then(Value::as_str)
            .map(String::from)
    });

    // Unknown keys (the embedded name/price/image) are dropped here, which
    // also canonicalizes the fingerprint.
    let customizations: Customizations = serde_json::from_value(custom).unwrap_or_default();

    CartLine {
        id: item.id.to_string(),
        product_id: item.product_id.or_else(|| menu_item.and_then(|m| m.id)),
        name,
        unit_price,
        quantity: item.quantity,
        customizations,
        image,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pricing::OptionChoice;

    fn temp_store() -> LocalStore {
        let path = std::env::temp_dir().join(format!(
            "stonefire-cart-test-{}.json",
            uuid::Uuid::new_v4()
        ));
        LocalStore::open(path).unwrap()
    }

    fn pepperoni_line(quantity: u32) -> CartLine {
        CartLine {
            id: "pepperoni".to_string(),
            product_id: Some(ProductId::new(3)),
            name: "Pepperoni".to_string(),
            unit_price: Price::from_cents(1450),
            quantity,
            customizations: Customizations {
                crust: Some(OptionChoice::free("Original")),
                ..Customizations::default()
            },
            image: None,
        }
    }

    #[tokio::test]
    async fn test_add_same_identity_increments_quantity() {
        let mut cart = CartStore::new(None, temp_store());
        cart.add(pepperoni_line(1)).await.unwrap();
        cart.add(pepperoni_line(2)).await.unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_add_different_customizations_appends() {
        let mut cart = CartStore::new(None, temp_store());
        cart.add(pepperoni_line(1)).await.unwrap();

        let mut thin = pepperoni_line(1);
        thin.customizations.crust = Some(OptionChoice::free("Thin"));
        cart.add(thin).await.unwrap();

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_items(), 2);
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes_line() {
        let mut cart = CartStore::new(None, temp_store());
        let line = pepperoni_line(2);
        let customizations = line.customizations.clone();
        cart.add(line).await.unwrap();

        cart.set_quantity("pepperoni", &customizations, 0)
            .await
            .unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_remove_only_matching_customizations() {
        let mut cart = CartStore::new(None, temp_store());
        cart.add(pepperoni_line(1)).await.unwrap();
        let mut thin = pepperoni_line(1);
        thin.customizations.crust = Some(OptionChoice::free("Thin"));
        let thin_customizations = thin.customizations.clone();
        cart.add(thin).await.unwrap();

        cart.remove("pepperoni", &thin_customizations).await.unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(
            cart.lines()[0].customizations.crust.as_ref().unwrap().name,
            "Original"
        );
    }

    #[tokio::test]
    async fn test_totals() {
        let mut cart = CartStore::new(None, temp_store());
        cart.add(pepperoni_line(2)).await.unwrap();
        let mut custom = pepperoni_line(1);
        custom.id = "veggie".to_string();
        custom.unit_price = Price::from_cents(1100);
        cart.add(custom).await.unwrap();

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Price::from_cents(2 * 1450 + 1100));
    }

    #[tokio::test]
    async fn test_local_cart_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!(
            "stonefire-cart-test-{}.json",
            uuid::Uuid::new_v4()
        ));
        {
            let store = LocalStore::open(&path).unwrap();
            let mut cart = CartStore::new(None, store);
            cart.add(pepperoni_line(2)).await.unwrap();
        }
        let store = LocalStore::open(&path).unwrap();
        let cart = CartStore::new(None, store);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_line_from_remote_prefers_menu_item_fields() {
        let item: RemoteCartItem = serde_json::from_value(serde_json::json!({
            "id": 11,
            "product_id": 3,
            "quantity": 2,
            "unit_price": 14.5,
            "custom_data": {"crust": {"name": "Thin", "price": 0.0}, "image": "stored.png"},
            "menu_item": {"id": 3, "name": "Pepperoni", "price": 14.5, "image": "menu.png"}
        }))
        .unwrap();

        let line = line_from_remote(item);
        assert_eq!(line.id, "11");
        assert_eq!(line.name, "Pepperoni");
        assert_eq!(line.image.as_deref(), Some("menu.png"));
        assert_eq!(line.unit_price, Price::from_cents(1450));
        assert_eq!(line.customizations.crust.as_ref().unwrap().name, "Thin");
    }

    #[test]
    fn test_line_from_remote_custom_item_falls_back() {
        let item: RemoteCartItem = serde_json::from_value(serde_json::json!({
            "id": 12,
            "quantity": 1,
            "custom_data": {"name": "Build Your Own", "price": 16.25, "image": "byo.png"}
        }))
        .unwrap();

        let line = line_from_remote(item);
        assert_eq!(line.name, "Build Your Own");
        assert_eq!(line.unit_price, Price::from_cents(1625));
        assert_eq!(line.image.as_deref(), Some("byo.png"));
        assert!(line.product_id.is_none());
    }

    #[test]
    fn test_add_request_embeds_custom_item_identity() {
        let mut line = pepperoni_line(1);
        line.product_id = None;
        line.image = Some("byo.png".to_string());

        let request = add_request(&line);
        let custom = request.custom_data.unwrap();
        assert_eq!(custom["name"], "Pepperoni");
        assert_eq!(custom["image"], "byo.png");
        assert!(custom.get("price").is_some());
        assert!(request.product_id.is_none());
    }
}
