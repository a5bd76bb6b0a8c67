//! Integration test harness for Stonefire.
//!
//! The real backend is an external collaborator, so these tests run the
//! actual client crates against [`MockBackend`]: an in-process `axum` server
//! speaking the same REST surface (auth, cart, checkout, orders, payments,
//! locations, admin). Tests mutate [`MockState`] directly to script
//! scenarios - wrapped order lists, pending-count sequences, payment
//! failures, forced 401s.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p stonefire-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::Json;
use serde_json::{Value, json};

use stonefire_admin::config::AdminConfig;
use stonefire_storefront::config::StorefrontConfig;

pub type SharedState = Arc<Mutex<MockState>>;

/// A seeded customer account.
#[derive(Debug, Clone)]
pub struct MockUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// A seeded admin account.
#[derive(Debug, Clone)]
pub struct MockAdmin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub store_id: i64,
}

/// A catalog product the mock cart can price.
#[derive(Debug, Clone)]
pub struct MockProduct {
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
}

/// One line in a mock backend cart.
#[derive(Debug, Clone)]
pub struct MockCartItem {
    pub id: i64,
    pub product_id: Option<i64>,
    pub quantity: u32,
    pub unit_price: f64,
    pub custom_data: Option<Value>,
}

/// Mutable backend state, scripted by tests.
pub struct MockState {
    next_id: i64,
    pub users: Vec<MockUser>,
    pub admins: Vec<MockAdmin>,
    pub tokens: HashMap<String, i64>,
    pub admin_tokens: HashMap<String, i64>,
    pub products: BTreeMap<i64, MockProduct>,
    pub carts: HashMap<i64, Vec<MockCartItem>>,
    /// Orders as raw JSON so tests control their exact shape.
    pub orders: Vec<Value>,
    pub locations: Vec<Value>,
    pub publishable_key: String,
    /// Make `POST /payments/create-payment-intent` fail with 503.
    pub payment_intent_fails: bool,
    /// Wrap `GET /orders` and `GET /admin/orders` under this key.
    pub wrap_orders_key: Option<&'static str>,
    /// Scripted `GET /admin/orders` bodies, indexed by call number (the
    /// last entry repeats). Empty means "serve the live order list".
    pub admin_orders_script: Vec<Value>,
    pub admin_orders_calls: usize,
    pub orders_calls: usize,
    pub products_calls: usize,
    pub checkout_calls: usize,
    /// Answer every authenticated endpoint with 401.
    pub force_unauthorized: bool,
    /// Answer `GET /orders` with 500.
    pub orders_fail: bool,
    pub store_active: bool,
}

impl Default for MockState {
    fn default() -> Self {
        let mut products = BTreeMap::new();
        products.insert(
            7,
            MockProduct {
                name: "Pepperoni".to_string(),
                price: 14.50,
                image: Some("pepperoni.png".to_string()),
            },
        );
        products.insert(
            8,
            MockProduct {
                name: "Margherita".to_string(),
                price: 11.00,
                image: None,
            },
        );

        Self {
            next_id: 100,
            users: vec![MockUser {
                id: 1,
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                password: "correct-horse".to_string(),
                phone: "555-0100".to_string(),
            }],
            admins: vec![MockAdmin {
                id: 1,
                name: "Sam Owner".to_string(),
                email: "owner@example.com".to_string(),
                password: "admin-pass".to_string(),
                store_id: 1,
            }],
            tokens: HashMap::new(),
            admin_tokens: HashMap::new(),
            products,
            carts: HashMap::new(),
            orders: Vec::new(),
            locations: vec![
                json!({
                    "id": 1,
                    "store_name": "Downtown",
                    "address": "1 Oven Way",
                    "city": "Springfield",
                    "is_active": true
                }),
                json!({
                    "id": 2,
                    "store_name": "Riverside",
                    "address": "9 Dough Ln",
                    "city": "Springfield",
                    "is_active": false
                }),
            ],
            publishable_key: "pk_test_stonefire".to_string(),
            payment_intent_fails: false,
            wrap_orders_key: None,
            admin_orders_script: Vec::new(),
            admin_orders_calls: 0,
            orders_calls: 0,
            products_calls: 0,
            checkout_calls: 0,
            force_unauthorized: false,
            orders_fail: false,
            store_active: true,
        }
    }
}

impl MockState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Issue a customer token without going through login.
    pub fn issue_token(&mut self, user_id: i64) -> String {
        let token = format!("tok_{}", uuid::Uuid::new_v4().simple());
        self.tokens.insert(token.clone(), user_id);
        token
    }

    /// Push an order owned by `user_id` with the given status.
    pub fn seed_order(&mut self, user_id: i64, status: &str, total: f64) -> i64 {
        let id = self.next_id();
        self.orders.push(json!({
            "id": id,
            "user_id": user_id,
            "status": status,
            "total": total,
            "created_at": "2026-08-05T12:00:00",
            "items": []
        }));
        id
    }
}

/// An in-process mock of the ordering backend.
pub struct MockBackend {
    pub base_url: String,
    state: SharedState,
}

impl MockBackend {
    /// Bind to an ephemeral port and start serving.
    pub async fn spawn() -> Self {
        let state: SharedState = Arc::new(Mutex::new(MockState::default()));
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Lock the scripted state.
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A storefront configuration pointing at this backend, with its own
    /// throwaway state file.
    pub fn storefront_config(&self) -> StorefrontConfig {
        StorefrontConfig::with_backend(&self.base_url, temp_state_path()).unwrap()
    }

    /// An admin configuration pointing at this backend.
    pub fn admin_config(&self) -> AdminConfig {
        AdminConfig::new(&self.base_url, temp_state_path()).unwrap()
    }
}

/// A unique state-file path under the system temp dir.
pub fn temp_state_path() -> PathBuf {
    std::env::temp_dir().join(format!("stonefire-it-{}.json", uuid::Uuid::new_v4()))
}

// =============================================================================
// Router
// =============================================================================

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/auth/signup", post(auth_signup))
        .route("/auth/login", post(auth_login))
        .route("/auth/me", get(auth_me).patch(auth_update))
        .route("/auth/change-password", post(auth_change_password))
        .route("/cart", get(cart_get))
        .route("/cart/add", post(cart_add))
        .route("/cart/update", put(cart_update))
        .route("/cart/remove/{id}", delete(cart_remove))
        .route("/cart/clear", delete(cart_clear))
        .route("/menu/categories", get(menu_categories))
        .route("/menu/products", get(menu_products))
        .route("/menu/toppings", get(menu_toppings))
        .route("/menu/specialty", get(menu_products))
        .route("/orders/checkout", post(orders_checkout))
        .route("/orders", get(orders_list))
        .route("/orders/{id}", get(orders_get_one))
        .route("/locations", get(locations_list))
        .route("/locations/search", get(locations_search))
        .route("/payments/config", get(payments_config))
        .route("/payments/create-payment-intent", post(payments_intent))
        .route("/admin/login", post(admin_login))
        .route("/admin/signup", post(admin_signup))
        .route("/admin/me", get(admin_me))
        .route("/admin/orders", get(admin_orders))
        .route("/admin/orders/{id}", patch(admin_order_patch))
        .route("/admin/store", get(admin_store).patch(admin_store_patch))
        .route("/admin/stats", get(admin_stats))
        .with_state(state)
}

// =============================================================================
// Helpers
// =============================================================================

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Not authenticated"})),
    )
        .into_response()
}

fn bad_request(detail: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": detail})),
    )
        .into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(String::from)
}

fn require_user(state: &MockState, headers: &HeaderMap) -> Result<i64, Response> {
    if state.force_unauthorized {
        return Err(unauthorized());
    }
    bearer(headers)
        .and_then(|token| state.tokens.get(&token).copied())
        .ok_or_else(unauthorized)
}

fn require_admin(state: &MockState, headers: &HeaderMap) -> Result<i64, Response> {
    if state.force_unauthorized {
        return Err(unauthorized());
    }
    bearer(headers)
        .and_then(|token| state.admin_tokens.get(&token).copied())
        .ok_or_else(unauthorized)
}

fn cart_item_json(state: &MockState, item: &MockCartItem) -> Value {
    let menu_item = item.product_id.and_then(|product_id| {
        state.products.get(&product_id).map(|product| {
            json!({
                "id": product_id,
                "name": product.name,
                "price": item.unit_price,
                "image": product.image,
            })
        })
    });
    json!({
        "id": item.id,
        "product_id": item.product_id,
        "quantity": item.quantity,
        "unit_price": item.unit_price,
        "custom_data": item.custom_data,
        "menu_item": menu_item,
    })
}

fn wrap_orders(state: &MockState, orders: Vec<Value>) -> Value {
    match state.wrap_orders_key {
        Some(key) => json!({ key: orders }),
        None => Value::Array(orders),
    }
}

// =============================================================================
// Auth handlers
// =============================================================================

async fn auth_signup(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.users.iter().any(|user| user.email == email) {
        return bad_request("User already exists");
    }
    let id = state.next_id();
    state.users.push(MockUser {
        id,
        name: body["name"].as_str().unwrap_or_default().to_string(),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        phone: body["phone"].as_str().unwrap_or_default().to_string(),
    });
    Json(json!({"message": "Signup successful"})).into_response()
}

async fn auth_login(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let Some(user) = state.users.iter().find(|user| user.email == email).cloned() else {
        return (
            StatusCode::UNAUTHORIZED,
            [("x-error-type", "email")],
            Json(json!({"detail": "User not found"})),
        )
            .into_response();
    };
    if user.password != password {
        return (
            StatusCode::UNAUTHORIZED,
            [("x-error-type", "password")],
            Json(json!({"detail": "Invalid credentials"})),
        )
            .into_response();
    }

    let token = state.issue_token(user.id);
    Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user": {"id": user.id, "name": user.name, "email": user.email, "phone": user.phone}
    }))
    .into_response()
}

async fn auth_me(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let user = state.users.iter().find(|user| user.id == user_id).unwrap();
    Json(json!({
        "id": user.id, "name": user.name, "email": user.email, "phone": user.phone
    }))
    .into_response()
}

async fn auth_update(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let user = state
        .users
        .iter_mut()
        .find(|user| user.id == user_id)
        .unwrap();
    if let Some(name) = body["name"].as_str() {
        user.name = name.to_string();
    }
    if let Some(phone) = body["phone"].as_str() {
        user.phone = phone.to_string();
    }
    Json(json!({
        "id": user.id, "name": user.name, "email": user.email, "phone": user.phone
    }))
    .into_response()
}

async fn auth_change_password(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let user = state
        .users
        .iter_mut()
        .find(|user| user.id == user_id)
        .unwrap();
    if body["current_password"].as_str() != Some(user.password.as_str()) {
        return bad_request("Current password is incorrect");
    }
    user.password = body["new_password"].as_str().unwrap_or_default().to_string();
    Json(json!({"message": "Password changed"})).into_response()
}

// =============================================================================
// Cart handlers
// =============================================================================

async fn cart_get(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let items: Vec<Value> = state
        .carts
        .get(&user_id)
        .map(|items| {
            items
                .iter()
                .map(|item| cart_item_json(&state, item))
                .collect()
        })
        .unwrap_or_default();
    Json(json!({ "items": items })).into_response()
}

async fn cart_add(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let product_id = body["product_id"].as_i64();
    let quantity = u32::try_from(body["quantity"].as_i64().unwrap_or(1)).unwrap_or(1);
    let custom_data = match &body["custom_data"] {
        Value::Null => None,
        other => Some(other.clone()),
    };

    let unit_price = match product_id {
        Some(product_id) => match state.products.get(&product_id) {
            Some(product) => product.price,
            None => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({"detail": "Product not found"})),
                )
                    .into_response();
            }
        },
        None => match custom_data
            .as_ref()
            .and_then(|data| data.get("price"))
            .and_then(Value::as_f64)
        {
            Some(price) if price >= 0.0 => price,
            _ => return bad_request("custom_data required for custom pizza"),
        },
    };

    let id = state.next_id();
    state.carts.entry(user_id).or_default().push(MockCartItem {
        id,
        product_id,
        quantity,
        unit_price,
        custom_data,
    });
    Json(json!({"id": id})).into_response()
}

async fn cart_update(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let item_id = body["item_id"].as_i64().unwrap_or_default();
    let quantity = u32::try_from(body["quantity"].as_i64().unwrap_or(1)).unwrap_or(1);

    let Some(item) = state
        .carts
        .entry(user_id)
        .or_default()
        .iter_mut()
        .find(|item| item.id == item_id)
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Cart item not found"})),
        )
            .into_response();
    };
    item.quantity = quantity;
    Json(json!({"id": item_id})).into_response()
}

async fn cart_remove(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(item_id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    state
        .carts
        .entry(user_id)
        .or_default()
        .retain(|item| item.id != item_id);
    StatusCode::NO_CONTENT.into_response()
}

async fn cart_clear(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    state.carts.insert(user_id, Vec::new());
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Menu handlers
// =============================================================================

async fn menu_products(State(state): State<SharedState>) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    state.products_calls += 1;
    let products: Vec<Value> = state
        .products
        .iter()
        .map(|(id, product)| {
            json!({
                "id": id,
                "name": product.name,
                "category_id": 1,
                "type": "pizza",
                "base_price": product.price,
                "image": product.image,
            })
        })
        .collect();
    Json(Value::Array(products)).into_response()
}

async fn menu_categories() -> Response {
    Json(json!([
        {"id": 1, "name": "Pizzas"},
        {"id": 2, "name": "Drinks"}
    ]))
    .into_response()
}

async fn menu_toppings(Query(params): Query<HashMap<String, String>>) -> Response {
    let all = [
        json!({"id": 1, "name": "Mozzarella", "type": "cheese"}),
        json!({"id": 2, "name": "Pepperoni", "type": "meat"}),
        json!({"id": 3, "name": "Mushrooms", "type": "veggie"}),
    ];
    let toppings: Vec<Value> = all
        .into_iter()
        .filter(|topping| match params.get("type") {
            Some(kind) => topping["type"].as_str() == Some(kind),
            None => true,
        })
        .collect();
    Json(Value::Array(toppings)).into_response()
}

// =============================================================================
// Order handlers
// =============================================================================

async fn orders_checkout(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    state.checkout_calls += 1;

    let items = state.carts.get(&user_id).cloned().unwrap_or_default();
    if items.is_empty() {
        return bad_request("Cart is empty");
    }

    let total: f64 = items
        .iter()
        .map(|item| item.unit_price * f64::from(item.quantity))
        .sum();
    let order_items: Vec<Value> = items
        .iter()
        .map(|item| {
            let name = item
                .product_id
                .and_then(|id| state.products.get(&id))
                .map_or_else(
                    || {
                        item.custom_data
                            .as_ref()
                            .and_then(|data| data.get("name"))
                            .and_then(Value::as_str)
                            .unwrap_or("Custom")
                            .to_string()
                    },
                    |product| product.name.clone(),
                );
            json!({
                "product_name": name,
                "quantity": item.quantity,
                "unit_price": item.unit_price,
            })
        })
        .collect();

    let id = state.next_id();
    state.orders.push(json!({
        "id": id,
        "user_id": user_id,
        "status": "PENDING",
        "total": total,
        "created_at": "2026-08-05T12:00:00",
        "items": order_items,
        "delivery": body,
    }));
    state.carts.insert(user_id, Vec::new());

    Json(json!({"id": id, "total": total})).into_response()
}

async fn orders_list(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    state.orders_calls += 1;
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    if state.orders_fail {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "order lookup failed"})),
        )
            .into_response();
    }
    let orders: Vec<Value> = state
        .orders
        .iter()
        .filter(|order| order["user_id"].as_i64() == Some(user_id))
        .cloned()
        .collect();
    Json(wrap_orders(&state, orders)).into_response()
}

async fn orders_get_one(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(order_id): Path<i64>,
) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let user_id = match require_user(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    match state.orders.iter().find(|order| {
        order["id"].as_i64() == Some(order_id) && order["user_id"].as_i64() == Some(user_id)
    }) {
        Some(order) => Json(order.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Order not found"})),
        )
            .into_response(),
    }
}

// =============================================================================
// Location handlers
// =============================================================================

async fn locations_list(State(state): State<SharedState>) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    Json(Value::Array(state.locations.clone())).into_response()
}

async fn locations_search(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let query = params
        .get("q")
        .map(|q| q.to_lowercase())
        .unwrap_or_default();
    let matches: Vec<Value> = state
        .locations
        .iter()
        .filter(|location| {
            ["store_name", "city", "address"].iter().any(|field| {
                location[field]
                    .as_str()
                    .is_some_and(|text| text.to_lowercase().contains(&query))
            })
        })
        .cloned()
        .collect();
    Json(Value::Array(matches)).into_response()
}

// =============================================================================
// Payment handlers
// =============================================================================

async fn payments_config(State(state): State<SharedState>) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    Json(json!({"publishable_key": state.publishable_key})).into_response()
}

async fn payments_intent(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(response) = require_user(&state, &headers) {
        return response;
    }
    if state.payment_intent_fails {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"detail": "Payment service is not configured"})),
        )
            .into_response();
    }

    let order_id = body["order_id"].as_i64().unwrap_or_default();
    let Some(order) = state
        .orders
        .iter()
        .find(|order| order["id"].as_i64() == Some(order_id))
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Order not found"})),
        )
            .into_response();
    };

    let total = order["total"].as_f64().unwrap_or_default();
    #[allow(clippy::cast_possible_truncation)]
    let amount_cents = (total * 100.0).round() as i64;
    Json(json!({
        "client_secret": format!("pi_{order_id}_secret_test"),
        "payment_intent_id": format!("pi_{order_id}"),
        "amount_cents": amount_cents,
    }))
    .into_response()
}

// =============================================================================
// Admin handlers
// =============================================================================

async fn admin_login(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let Some(admin) = state
        .admins
        .iter()
        .find(|admin| admin.email == email)
        .cloned()
    else {
        return (
            StatusCode::UNAUTHORIZED,
            [("x-error-type", "email")],
            Json(json!({"detail": "Invalid email or password"})),
        )
            .into_response();
    };
    if admin.password != password {
        return (
            StatusCode::UNAUTHORIZED,
            [("x-error-type", "password")],
            Json(json!({"detail": "Invalid email or password"})),
        )
            .into_response();
    }

    let token = format!("admin_{}", uuid::Uuid::new_v4().simple());
    state.admin_tokens.insert(token.clone(), admin.id);
    Json(json!({
        "access_token": token,
        "admin_name": admin.name,
        "store_id": admin.store_id,
        "role": "store_admin",
    }))
    .into_response()
}

async fn admin_signup(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.admins.iter().any(|admin| admin.email == email) {
        return bad_request("Admin already exists");
    }
    let id = state.next_id();
    let store_id = state.next_id();
    state.admins.push(MockAdmin {
        id,
        name: body["admin_name"].as_str().unwrap_or_default().to_string(),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        store_id,
    });
    let token = format!("admin_{}", uuid::Uuid::new_v4().simple());
    state.admin_tokens.insert(token.clone(), id);
    Json(json!({
        "access_token": token,
        "admin_name": body["admin_name"],
        "store_id": store_id,
        "role": "store_admin",
    }))
    .into_response()
}

async fn admin_me(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let admin_id = match require_admin(&state, &headers) {
        Ok(admin_id) => admin_id,
        Err(response) => return response,
    };
    let admin = state
        .admins
        .iter()
        .find(|admin| admin.id == admin_id)
        .unwrap();
    Json(json!({
        "name": admin.name,
        "email": admin.email,
        "store": {"id": admin.store_id, "name": "Downtown", "is_active": state.store_active},
    }))
    .into_response()
}

async fn admin_orders(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }

    if !state.admin_orders_script.is_empty() {
        let index = state.admin_orders_calls.min(state.admin_orders_script.len() - 1);
        state.admin_orders_calls += 1;
        return Json(state.admin_orders_script[index].clone()).into_response();
    }

    state.admin_orders_calls += 1;
    let orders = state.orders.clone();
    Json(wrap_orders(&state, orders)).into_response()
}

async fn admin_order_patch(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(order_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    let status = body["status"].clone();
    let Some(order) = state
        .orders
        .iter_mut()
        .find(|order| order["id"].as_i64() == Some(order_id))
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Order not found"})),
        )
            .into_response();
    };
    order["status"] = status;
    Json(order.clone()).into_response()
}

async fn admin_store(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    Json(json!({"id": 1, "name": "Downtown", "is_active": state.store_active})).into_response()
}

async fn admin_store_patch(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    if let Some(is_active) = body["is_active"].as_bool() {
        state.store_active = is_active;
    }
    Json(json!({"message": "Store updated"})).into_response()
}

async fn admin_stats(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(response) = require_admin(&state, &headers) {
        return response;
    }
    let pending = state
        .orders
        .iter()
        .filter(|order| order["status"].as_str() == Some("PENDING"))
        .count();
    Json(json!({"orders": state.orders.len(), "pending": pending})).into_response()
}
