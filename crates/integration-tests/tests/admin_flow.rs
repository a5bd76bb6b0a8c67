//! Admin client flow: store-scoped auth, order status transitions, store
//! activation, and stats.

#![allow(clippy::unwrap_used)]

use stonefire_admin::client::{AdminClient, AdminError};
use stonefire_core::{OrderId, OrderStatus};
use stonefire_integration_tests::MockBackend;

async fn signed_in_admin(mock: &MockBackend) -> AdminClient {
    let mut client = AdminClient::new(&mock.admin_config()).unwrap();
    client
        .login("owner@example.com", "admin-pass", None)
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn login_captures_identity_and_persists() {
    let mock = MockBackend::spawn().await;
    let config = mock.admin_config();

    {
        let mut client = AdminClient::new(&config).unwrap();
        let identity = client
            .login("owner@example.com", "admin-pass", None)
            .await
            .unwrap();
        assert_eq!(identity.name.as_deref(), Some("Sam Owner"));
        assert_eq!(identity.store_id.map(i64::from), Some(1));
    }

    // Restore from the persisted admin auth
    let mut client = AdminClient::new(&config).unwrap();
    client.restore().await;
    assert!(client.is_authenticated());
    assert_eq!(client.store_id().map(i64::from), Some(1));
}

#[tokio::test]
async fn login_failure_names_the_field() {
    let mock = MockBackend::spawn().await;
    let mut client = AdminClient::new(&mock.admin_config()).unwrap();

    let result = client
        .login("owner@example.com", "wrong", None)
        .await;
    let Err(AdminError::Api(e)) = result else {
        panic!("bad admin credentials must fail");
    };
    assert_eq!(e.field(), Some("password"));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn signup_creates_store_and_signs_in() {
    let mock = MockBackend::spawn().await;
    let mut client = AdminClient::new(&mock.admin_config()).unwrap();

    let identity = client
        .signup(&stonefire_admin::types::AdminSignupRequest {
            store_name: "Hilltop".to_string(),
            address: None,
            city: Some("Springfield".to_string()),
            state: None,
            pincode: None,
            phone: None,
            admin_name: "New Owner".to_string(),
            email: "hilltop@example.com".to_string(),
            password: "fresh-dough-7".to_string(),
        })
        .await
        .unwrap();

    assert!(client.is_authenticated());
    assert_eq!(identity.name.as_deref(), Some("New Owner"));
    assert!(identity.store_id.is_some());
}

#[tokio::test]
async fn orders_normalize_wrapped_responses() {
    let mock = MockBackend::spawn().await;
    mock.state().seed_order(1, "PENDING", 23.50);
    mock.state().seed_order(1, "delivered", 11.00);
    mock.state().wrap_orders_key = Some("results");

    let client = signed_in_admin(&mock).await;
    let orders = client.orders(None).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].status(), Some(OrderStatus::Pending));
    // Casing from the backend is tolerated
    assert_eq!(orders[1].status(), Some(OrderStatus::Delivered));
}

#[tokio::test]
async fn status_update_roundtrips() {
    let mock = MockBackend::spawn().await;
    let order_id = mock.state().seed_order(1, "PENDING", 23.50);

    let client = signed_in_admin(&mock).await;
    client
        .set_order_status(OrderId::new(order_id), OrderStatus::Accepted)
        .await
        .unwrap();

    let orders = client.orders(None).await.unwrap();
    assert_eq!(orders[0].status(), Some(OrderStatus::Accepted));
}

#[tokio::test]
async fn store_activation_toggle() {
    let mock = MockBackend::spawn().await;
    let client = signed_in_admin(&mock).await;

    assert!(client.store().await.unwrap().is_active);
    client.set_store_active(false).await.unwrap();
    assert!(!client.store().await.unwrap().is_active);
    client.set_store_active(true).await.unwrap();
    assert!(client.store().await.unwrap().is_active);
}

#[tokio::test]
async fn stats_passthrough() {
    let mock = MockBackend::spawn().await;
    mock.state().seed_order(1, "PENDING", 23.50);
    mock.state().seed_order(1, "ACCEPTED", 9.00);

    let client = signed_in_admin(&mock).await;
    let stats = client.stats().await.unwrap();
    assert_eq!(stats["orders"], 2);
    assert_eq!(stats["pending"], 1);
}

#[tokio::test]
async fn admin_hook_fires_on_unauthorized() {
    let mock = MockBackend::spawn().await;
    let client = signed_in_admin(&mock).await;

    let fired = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = fired.clone();
    client.install_sign_out_hook(move || {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });

    mock.state().force_unauthorized = true;
    assert!(client.orders(None).await.is_err());
    assert_eq!(fired.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(!client.is_authenticated());
}
