//! Menu catalog caching and location lookup.

#![allow(clippy::unwrap_used)]

use stonefire_core::Price;
use stonefire_integration_tests::MockBackend;
use stonefire_storefront::state::App;

#[tokio::test]
async fn products_are_cached_between_calls() {
    let mock = MockBackend::spawn().await;
    let app = App::new(mock.storefront_config()).unwrap();
    let api = app.api().unwrap();

    let first = api.products(None).await.unwrap();
    let second = api.products(None).await.unwrap();
    assert_eq!(first.len(), second.len());
    assert_eq!(
        mock.state().products_calls,
        1,
        "the second read must come from the cache"
    );

    api.invalidate_menu_cache().await;
    let _ = api.products(None).await.unwrap();
    assert_eq!(mock.state().products_calls, 2);
}

#[tokio::test]
async fn products_parse_prices_as_decimals() {
    let mock = MockBackend::spawn().await;
    let app = App::new(mock.storefront_config()).unwrap();

    let products = app.api().unwrap().products(None).await.unwrap();
    let pepperoni = products
        .iter()
        .find(|product| product.name == "Pepperoni")
        .unwrap();
    assert_eq!(pepperoni.base_price, Price::from_cents(1450));
}

#[tokio::test]
async fn categories_toppings_and_specialty_load() {
    let mock = MockBackend::spawn().await;
    let app = App::new(mock.storefront_config()).unwrap();
    let api = app.api().unwrap();

    let categories = api.categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Pizzas");

    let cheeses = api.toppings(Some("cheese")).await.unwrap();
    assert_eq!(cheeses.len(), 1);
    assert_eq!(cheeses[0].name, "Mozzarella");

    let specialty = api.specialty().await.unwrap();
    assert!(!specialty.is_empty());
}

#[tokio::test]
async fn location_search_matches_name_and_flags_inactive() {
    let mock = MockBackend::spawn().await;
    let app = App::new(mock.storefront_config()).unwrap();
    let api = app.api().unwrap();

    let all = api.locations().await.unwrap();
    assert_eq!(all.len(), 2);

    let riverside = api.search_locations("riverside", None).await.unwrap();
    assert_eq!(riverside.len(), 1);
    assert!(!riverside[0].is_active);

    let springfield = api.search_locations("springfield", Some(5.0)).await.unwrap();
    assert_eq!(springfield.len(), 2);
}
