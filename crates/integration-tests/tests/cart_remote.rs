//! Backend-backed cart behavior: auth gating and write-then-refetch
//! reconciliation.

#![allow(clippy::unwrap_used)]

use stonefire_core::{Price, ProductId};
use stonefire_integration_tests::MockBackend;
use stonefire_storefront::cart::{CartError, CartLine};
use stonefire_storefront::pricing::{Customizations, OptionChoice};
use stonefire_storefront::state::App;

fn product_line(product_id: i64, name: &str, quantity: u32) -> CartLine {
    CartLine {
        id: product_id.to_string(),
        product_id: Some(ProductId::new(product_id)),
        name: name.to_string(),
        unit_price: Price::ZERO, // the backend prices catalog items
        quantity,
        customizations: Customizations {
            crust: Some(OptionChoice::free("Original")),
            ..Customizations::default()
        },
        image: None,
    }
}

async fn signed_in_app(mock: &MockBackend) -> App {
    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;
    app.session_mut()
        .unwrap()
        .login("ada@example.com", "correct-horse")
        .await
        .unwrap();
    app
}

#[tokio::test]
async fn add_without_session_is_rejected_and_mutates_nothing() {
    let mock = MockBackend::spawn().await;
    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;

    let result = app.cart_mut().add(product_line(7, "Pepperoni", 1)).await;
    assert!(matches!(result, Err(CartError::AuthRequired)));
    assert!(app.cart().is_empty());
    assert!(mock.state().carts.is_empty());
}

#[tokio::test]
async fn add_posts_then_refetches_canonical_cart() {
    let mock = MockBackend::spawn().await;
    let mut app = signed_in_app(&mock).await;

    app.cart_mut()
        .add(product_line(7, "Pepperoni", 2))
        .await
        .unwrap();

    let lines = app.cart().lines();
    assert_eq!(lines.len(), 1);
    // Canonical state comes from the backend: its price, name, and image
    assert_eq!(lines[0].name, "Pepperoni");
    assert_eq!(lines[0].unit_price, Price::from_cents(1450));
    assert_eq!(lines[0].image.as_deref(), Some("pepperoni.png"));
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(app.cart().total_price(), Price::from_cents(2900));
}

#[tokio::test]
async fn set_quantity_and_zero_removes() {
    let mock = MockBackend::spawn().await;
    let mut app = signed_in_app(&mock).await;

    app.cart_mut()
        .add(product_line(7, "Pepperoni", 1))
        .await
        .unwrap();
    let line = app.cart().lines()[0].clone();

    app.cart_mut()
        .set_quantity(&line.id, &line.customizations, 4)
        .await
        .unwrap();
    assert_eq!(app.cart().total_items(), 4);

    app.cart_mut()
        .set_quantity(&line.id, &line.customizations, 0)
        .await
        .unwrap();
    assert!(app.cart().is_empty());
    assert!(mock.state().carts[&1].is_empty());
}

#[tokio::test]
async fn remove_and_clear_refetch_empty_cart() {
    let mock = MockBackend::spawn().await;
    let mut app = signed_in_app(&mock).await;

    app.cart_mut()
        .add(product_line(7, "Pepperoni", 1))
        .await
        .unwrap();
    app.cart_mut()
        .add(product_line(8, "Margherita", 1))
        .await
        .unwrap();
    assert_eq!(app.cart().lines().len(), 2);

    let first = app.cart().lines()[0].clone();
    app.cart_mut()
        .remove(&first.id, &first.customizations)
        .await
        .unwrap();
    assert_eq!(app.cart().lines().len(), 1);

    app.cart_mut().clear().await.unwrap();
    assert!(app.cart().is_empty());
}

#[tokio::test]
async fn custom_item_roundtrips_name_and_price() {
    let mock = MockBackend::spawn().await;
    let mut app = signed_in_app(&mock).await;

    let custom = CartLine {
        id: "build-your-own".to_string(),
        product_id: None,
        name: "Build Your Own".to_string(),
        unit_price: Price::from_cents(1625),
        quantity: 1,
        customizations: Customizations::default(),
        image: Some("byo.png".to_string()),
    };
    app.cart_mut().add(custom).await.unwrap();

    let lines = app.cart().lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].name, "Build Your Own");
    assert_eq!(lines[0].unit_price, Price::from_cents(1625));
    assert_eq!(lines[0].image.as_deref(), Some("byo.png"));
}
